use validator::ValidateEmail;

#[derive(Debug, Clone)]
/// A parsed email address. Only used for addresses we control (the welcome
/// email sender); signer addresses are passed through unvalidated.
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(email: String) -> Result<Self, String> {
        match ValidateEmail::validate_email(&email) {
            true => Ok(Self(email)),
            false => Err(format!("Invalid email: {email:?}")),
        }
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str { &self.0 }
}
