use std::path::PathBuf;

use clap::{Args, Parser};
use obj_to_html::canvas::{CanvasConfig, CanvasStore};
use obj_to_html::preview::{self, PreviewOptions};
use obj_to_html::token::{config_directory, Platform, TokenStore};
use obj_to_html::{
  convert_local, convert_published, AssetPaths, ConversionJob, Error, Result,
  ViewParameters,
};

/// OBJ to HTML - render an OBJ mesh in a self-contained three.js page
#[derive(Parser, Debug)]
#[command(name = "obj-to-html")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the OBJ file
  obj_file: PathBuf,

  /// Output HTML file
  output: PathBuf,

  /// Page title
  title: String,

  #[command(flatten)]
  view: ViewArgs,

  /// Texture image applied to the whole object
  #[arg(short = 'T', long)]
  texture: Option<PathBuf>,

  /// Material library; its texture paths are relative to the file itself
  #[arg(short = 'm', long = "mtl-file", alias = "mtl_file")]
  mtl_file: Option<PathBuf>,

  #[command(flatten)]
  canvas: CanvasArgs,

  #[command(flatten)]
  preview: PreviewArgs,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "View Options")]
struct ViewArgs {
  /// Near clipping distance of the camera
  #[arg(long, alias = "min_camera", default_value_t = 2.0)]
  min_camera: f64,

  /// Far clipping distance of the camera
  #[arg(long, alias = "max_camera", default_value_t = 1000.0)]
  max_camera: f64,

  /// Z coordinate of the camera
  #[arg(
    short = 'z',
    long,
    alias = "z_pos",
    default_value_t = 250.0,
    allow_negative_numbers = true
  )]
  z_pos: f64,

  /// Jinja template for the page (default: bundled template)
  #[arg(long, alias = "template_file")]
  template_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Canvas Upload")]
struct CanvasArgs {
  /// Upload the assets to Canvas and reference them by URL
  #[arg(long, alias = "auto_convert")]
  auto_convert: bool,

  /// Canvas access token (default: the token saved for --prefix)
  #[arg(long, alias = "access_token")]
  access_token: Option<String>,

  /// Save --access-token for later runs against --prefix
  #[arg(long, alias = "save_token", requires = "access_token")]
  save_token: bool,

  /// Canvas folder to upload into
  #[arg(long, default_value = "")]
  directory: String,

  /// Upload into this course instead of your own files
  #[arg(long, alias = "course_number")]
  course_number: Option<u64>,

  /// Canvas host
  #[arg(short, long, default_value = "canvas.sydney.edu.au")]
  prefix: String,
}

#[derive(Args, Debug)]
#[command(next_help_heading = "Preview")]
struct PreviewArgs {
  /// Serve the page over HTTP after converting
  #[arg(long)]
  serve: bool,

  /// Bind address
  #[arg(long, default_value = "127.0.0.1")]
  host: String,

  /// Server port
  #[arg(long, default_value_t = 8080)]
  port: u16,

  /// Open the page in the default browser
  #[arg(short, long, requires = "serve")]
  open: bool,

  /// Rebuild the page when an input file changes
  #[arg(long, requires = "serve", conflicts_with = "auto_convert")]
  watch: bool,
}

fn home_directory() -> Result<PathBuf> {
  ["HOME", "USERPROFILE"]
    .into_iter()
    .find_map(std::env::var_os)
    .map(PathBuf::from)
    .ok_or_else(|| Error::NotFound("home directory".into()))
}

fn canvas_store(args: &CanvasArgs) -> Result<CanvasStore> {
  let tokens = TokenStore::new(config_directory(
    Platform::current(),
    &home_directory()?,
  ));

  let access_token = match &args.access_token {
    Some(token) => {
      if args.save_token {
        tokens.save(token, &args.prefix)?;
      }
      token.clone()
    }
    None => tokens.load(&args.prefix)?,
  };

  CanvasStore::new(CanvasConfig {
    host: args.prefix.clone(),
    access_token,
    directory: args.directory.clone(),
    course_id: args.course_number,
  })
}

async fn run(cli: Cli) -> Result<()> {
  let mut assets = AssetPaths::new(cli.obj_file);
  assets.texture = cli.texture;
  assets.material = cli.mtl_file;

  let job = ConversionJob {
    assets,
    view: ViewParameters::new(
      cli.title,
      cli.view.min_camera,
      cli.view.max_camera,
      cli.view.z_pos,
    ),
    output: cli.output,
    template: cli.view.template_file,
  };

  if cli.canvas.auto_convert {
    let store = canvas_store(&cli.canvas)?;
    convert_published(&job, &store).await?;
  } else {
    convert_local(&job)?;
  }

  if cli.preview.serve {
    let options = PreviewOptions {
      host: cli.preview.host,
      port: cli.preview.port,
      open: cli.preview.open,
      watch: cli.preview.watch,
    };
    preview::serve(job, options).await?;
  }
  Ok(())
}

#[tokio::main]
async fn main() {
  env_logger::Builder::from_env(
    env_logger::Env::default().default_filter_or("info"),
  )
  .init();

  let cli = Cli::parse();
  if let Err(err) = run(cli).await {
    log::error!("{err}");
    std::process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use super::*;

  #[test]
  fn command_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn snake_case_flags_are_accepted() {
    let cli = Cli::try_parse_from([
      "obj-to-html",
      "cube.obj",
      "cube.html",
      "Cube",
      "--min_camera",
      "1",
      "--max_camera",
      "50",
      "--z_pos",
      "-3",
      "--template_file",
      "page.html",
      "--mtl_file",
      "cube.mtl",
      "--auto_convert",
      "--access_token",
      "tok",
      "--save_token",
      "--course_number",
      "42",
    ])
    .unwrap();

    assert_eq!(cli.view.min_camera, 1.0);
    assert_eq!(cli.view.max_camera, 50.0);
    assert_eq!(cli.view.z_pos, -3.0);
    assert_eq!(cli.view.template_file, Some(PathBuf::from("page.html")));
    assert_eq!(cli.mtl_file, Some(PathBuf::from("cube.mtl")));
    assert!(cli.canvas.auto_convert);
    assert_eq!(cli.canvas.access_token.as_deref(), Some("tok"));
    assert!(cli.canvas.save_token);
    assert_eq!(cli.canvas.course_number, Some(42));
  }

  #[test]
  fn kebab_case_flags_still_work() {
    let cli = Cli::try_parse_from([
      "obj-to-html",
      "cube.obj",
      "cube.html",
      "Cube",
      "--min-camera",
      "0.5",
      "--mtl-file",
      "cube.mtl",
    ])
    .unwrap();

    assert_eq!(cli.view.min_camera, 0.5);
    assert_eq!(cli.view.max_camera, 1000.0);
    assert_eq!(cli.mtl_file, Some(PathBuf::from("cube.mtl")));
  }
}
