mod email_address;
mod signup;
// allow external `use` statements to skip `signup` etc
pub use email_address::EmailAddress;
pub use signup::SignupRecord;
pub use signup::WelcomeValues;
