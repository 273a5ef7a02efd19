pub mod logger;
pub mod person;
pub mod person_id;
