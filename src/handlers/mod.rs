pub mod health;
pub mod moods;
pub mod reminder;
