pub mod follow_up;
pub mod handlers;
pub mod machine;
pub mod prompts;
pub mod question_bank;
pub mod scorer;
pub mod session;
pub mod socket;
