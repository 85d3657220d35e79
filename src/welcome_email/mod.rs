use tera::Context;
use tera::Tera;

use crate::domain::WelcomeValues;

const HTML_TEMPLATE: &str = "info_session.html";
const TEXT_TEMPLATE: &str = "info_session.txt";

/// The welcome email bodies, compiled once at startup.
///
/// Tera autoescapes by file extension: the `.html` body escapes signer-provided
/// values (the display name), the `.txt` body leaves them as typed.
#[derive(Debug)]
pub struct WelcomeTemplate {
    tera: Tera,
}

/// Both renderings of one welcome message
#[derive(Debug)]
pub struct WelcomeBody {
    pub html: String,
    pub text: String,
}

impl WelcomeTemplate {
    /// Compile the embedded templates (paths relative to this file, checked at
    /// compile time)
    pub fn new() -> Result<Self, tera::Error> {
        Self::from_raw(
            include_str!("./info_session.html"),
            include_str!("./info_session.txt"),
        )
    }

    pub fn from_raw(
        html: &str,
        text: &str,
    ) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![(HTML_TEMPLATE, html), (TEXT_TEMPLATE, text)])?;
        Ok(Self { tera })
    }

    #[tracing::instrument(name = "Rendering welcome email", skip(self))]
    pub fn render(
        &self,
        values: &WelcomeValues,
    ) -> Result<WelcomeBody, tera::Error> {
        let ctx = Context::from_serialize(values)?;
        Ok(WelcomeBody {
            html: self.tera.render(HTML_TEMPLATE, &ctx)?,
            text: self.tera.render(TEXT_TEMPLATE, &ctx)?,
        })
    }
}
