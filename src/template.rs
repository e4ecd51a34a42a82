//! Page templates.
//!
//! Templates use jinja syntax and see the fields of [`RenderContext`]. The
//! loader script is inserted verbatim, so auto-escaping is off and the
//! bundled page escapes the title itself.

use std::borrow::Cow;
use std::path::Path;

use minijinja::{AutoEscape, Environment};

use crate::context::RenderContext;
use crate::error::{Error, Result};

/// The page used when no template file is given.
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/default.html");

/// Reads `path`, or falls back to [`DEFAULT_TEMPLATE`].
pub fn load(path: Option<&Path>) -> Result<Cow<'static, str>> {
  match path {
    None => Ok(Cow::Borrowed(DEFAULT_TEMPLATE)),
    Some(path) if !path.is_file() => {
      Err(Error::NotFound(path.display().to_string()))
    }
    Some(path) => Ok(Cow::Owned(std::fs::read_to_string(path)?)),
  }
}

pub fn render(source: &str, context: &RenderContext) -> Result<String> {
  let mut env = Environment::new();
  env.set_auto_escape_callback(|_| AutoEscape::None);
  Ok(env.render_str(source, context)?)
}
