pub mod coach;
pub mod coursera;
pub mod db;
pub mod hackerrank;
pub mod leetcode;
pub mod udemy;
pub mod youtube;

pub use coach::OpenAiCoachAdapter;
pub use coursera::StaticCourseraAdapter;
pub use db::DbAdapter;
pub use hackerrank::HackerRankAdapter;
pub use leetcode::LeetCodeAdapter;
pub use udemy::UdemyAdapter;
pub use youtube::YouTubeAdapter;
