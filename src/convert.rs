use std::path::PathBuf;

use crate::asset::{AssetPaths, ResolvedAssets};
use crate::context::{self, RenderContext, ViewParameters};
use crate::error::Result;
use crate::persist;
use crate::resolver;
use crate::store::AssetStore;
use crate::template;

/// Everything needed to produce one page.
#[derive(Clone, Debug)]
pub struct ConversionJob {
  pub assets: AssetPaths,
  pub view: ViewParameters,
  pub output: PathBuf,
  /// Page template; the bundled one when `None`.
  pub template: Option<PathBuf>,
}

/// Renders a page that loads the assets from their local paths.
pub fn convert_local(job: &ConversionJob) -> Result<RenderContext> {
  job.view.validate()?;
  let source = template::load(job.template.as_deref())?;
  let resolved = resolver::resolve_local(&job.assets)?;
  write_page(job, &source, resolved)
}

/// Publishes the assets through `store` and renders a page that loads them
/// from the returned URLs.
///
/// View parameters and the template are checked before anything is
/// uploaded.
pub async fn convert_published<S: AssetStore>(
  job: &ConversionJob,
  store: &S,
) -> Result<RenderContext> {
  job.view.validate()?;
  let source = template::load(job.template.as_deref())?;
  let resolved = resolver::publish(&job.assets, store).await?;
  write_page(job, &source, resolved)
}

// The output is only replaced once the whole page has rendered.
fn write_page(
  job: &ConversionJob,
  source: &str,
  resolved: ResolvedAssets,
) -> Result<RenderContext> {
  let ctx = context::build(
    &job.view,
    resolved.object,
    resolved.texture,
    resolved.material,
  )?;
  let html = template::render(source, &ctx)?;

  persist::write_file(&job.output, html.as_bytes())?;
  log::info!("wrote {}", job.output.display());
  Ok(ctx)
}
