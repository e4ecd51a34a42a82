//! Picks the render mode and assembles the values handed to the template.

use serde::Serialize;

use crate::asset::AssetReference;
use crate::error::{Error, Result};
use crate::loader;

/// Camera and page settings. Defaults belong to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewParameters {
  pub title: String,
  pub min_camera: f64,
  pub max_camera: f64,
  pub z_pos: f64,
}

impl ViewParameters {
  pub fn new(
    title: impl Into<String>,
    min_camera: f64,
    max_camera: f64,
    z_pos: f64,
  ) -> Self {
    Self {
      title: title.into(),
      min_camera,
      max_camera,
      z_pos,
    }
  }

  pub fn validate(&self) -> Result<()> {
    if self.title.trim().is_empty() {
      return Err(Error::value("missing required title"));
    }
    let near = self.min_camera;
    let far = self.max_camera;
    if !near.is_finite() || !far.is_finite() || near <= 0.0 || near >= far {
      return Err(Error::value("invalid camera range"));
    }
    if !self.z_pos.is_finite() {
      return Err(Error::value("invalid z position"));
    }
    Ok(())
  }
}

/// Which loader the page uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
  PlainObject {
    object: AssetReference,
  },
  TexturedObject {
    object: AssetReference,
    texture: AssetReference,
  },
  MaterialObject {
    object: AssetReference,
    material: AssetReference,
  },
}

impl RenderMode {
  /// A material wins over a texture when both are given.
  pub fn select(
    object: AssetReference,
    texture: Option<AssetReference>,
    material: Option<AssetReference>,
  ) -> Self {
    match (texture, material) {
      (_, Some(material)) => RenderMode::MaterialObject { object, material },
      (Some(texture), None) => RenderMode::TexturedObject { object, texture },
      (None, None) => RenderMode::PlainObject { object },
    }
  }

  pub fn object(&self) -> &AssetReference {
    match self {
      RenderMode::PlainObject { object }
      | RenderMode::TexturedObject { object, .. }
      | RenderMode::MaterialObject { object, .. } => object,
    }
  }

  pub fn loader_script(&self) -> String {
    match self {
      RenderMode::PlainObject { object } => loader::plain(object),
      RenderMode::TexturedObject { object, texture } => {
        loader::textured(object, texture)
      }
      RenderMode::MaterialObject { object, material } => {
        loader::material(object, material)
      }
    }
  }
}

/// Flat string mapping consumed by the page template.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderContext {
  pub title: String,
  pub min_camera: String,
  pub max_camera: String,
  pub z_pos: String,
  pub object_reference: String,
  /// The object reference escaped for a single-quoted script string.
  pub object_label: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub texture_reference: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub material_reference: Option<String>,
  pub loader_script: String,
}

/// Builds the template context from already-resolved references.
pub fn build(
  view: &ViewParameters,
  object: AssetReference,
  texture: Option<AssetReference>,
  material: Option<AssetReference>,
) -> Result<RenderContext> {
  view.validate()?;
  let mode = RenderMode::select(object, texture, material);

  let (texture_reference, material_reference) = match &mode {
    RenderMode::PlainObject { .. } => (None, None),
    RenderMode::TexturedObject { texture, .. } => {
      (Some(texture.to_string()), None)
    }
    RenderMode::MaterialObject { material, .. } => {
      (None, Some(material.to_string()))
    }
  };

  Ok(RenderContext {
    title: view.title.clone(),
    min_camera: script_number(view.min_camera),
    max_camera: script_number(view.max_camera),
    z_pos: script_number(view.z_pos),
    object_reference: mode.object().to_string(),
    object_label: loader::quote(mode.object().as_str()),
    texture_reference,
    material_reference,
    loader_script: mode.loader_script(),
  })
}

/// Shortest round-tripping form, always with a `.` decimal point
/// (`2.0`, `0.5`, `1e20`). Valid as a JavaScript literal.
fn script_number(value: f64) -> String {
  format!("{value:?}")
}

#[cfg(test)]
mod tests {
  use super::*;

  fn local(path: &str) -> AssetReference {
    AssetReference::Local(path.into())
  }

  fn cube_view() -> ViewParameters {
    ViewParameters::new("Cube", 2.0, 1000.0, 250.0)
  }

  #[test]
  fn object_only_is_plain() {
    let ctx = build(&cube_view(), local("cube.obj"), None, None).unwrap();

    assert_eq!(ctx.loader_script, loader::plain(&local("cube.obj")));
    assert!(ctx.loader_script.contains("'cube.obj'"));
    assert_eq!(ctx.title, "Cube");
    assert_eq!(ctx.min_camera, "2.0");
    assert_eq!(ctx.max_camera, "1000.0");
    assert_eq!(ctx.z_pos, "250.0");
    assert_eq!(ctx.object_reference, "cube.obj");
    assert_eq!(ctx.texture_reference, None);
    assert_eq!(ctx.material_reference, None);
  }

  #[test]
  fn texture_without_material_is_textured() {
    let ctx = build(
      &cube_view(),
      local("cube.obj"),
      Some(local("skin.png")),
      None,
    )
    .unwrap();

    assert_eq!(
      ctx.loader_script,
      loader::textured(&local("cube.obj"), &local("skin.png"))
    );
    assert!(ctx.loader_script.contains("'cube.obj'"));
    assert!(ctx.loader_script.contains("'skin.png'"));
    assert_eq!(ctx.texture_reference.as_deref(), Some("skin.png"));
    assert_eq!(ctx.material_reference, None);
  }

  #[test]
  fn material_dominates_texture() {
    let mode = RenderMode::select(
      local("cube.obj"),
      Some(local("skin.png")),
      Some(local("cube.mtl")),
    );
    assert_eq!(
      mode,
      RenderMode::MaterialObject {
        object: local("cube.obj"),
        material: local("cube.mtl"),
      }
    );

    let ctx = build(
      &cube_view(),
      local("cube.obj"),
      Some(local("skin.png")),
      Some(local("cube.mtl")),
    )
    .unwrap();
    assert_eq!(ctx.material_reference.as_deref(), Some("cube.mtl"));
    assert_eq!(ctx.texture_reference, None);
    assert!(!ctx.loader_script.contains("skin.png"));
  }

  #[test]
  fn material_alone_is_material_mode() {
    let mode = RenderMode::select(local("a.obj"), None, Some(local("a.mtl")));
    assert!(matches!(mode, RenderMode::MaterialObject { .. }));
  }

  #[test]
  fn inverted_camera_range_is_rejected() {
    let view = ViewParameters::new("Cube", 1000.0, 2.0, 250.0);
    let err = build(&view, local("cube.obj"), None, None).unwrap_err();
    assert!(matches!(err, Error::Value(ref m) if m == "invalid camera range"));

    let equal = ViewParameters::new("Cube", 5.0, 5.0, 250.0);
    assert!(build(&equal, local("cube.obj"), None, None).is_err());
  }

  #[test]
  fn empty_title_is_rejected() {
    let view = ViewParameters::new("  ", 2.0, 1000.0, 250.0);
    let err = build(&view, local("cube.obj"), None, None).unwrap_err();
    assert_eq!(err.to_string(), "missing required title");
  }

  #[test]
  fn non_finite_values_are_rejected() {
    let far = ViewParameters::new("Cube", 2.0, f64::INFINITY, 250.0);
    assert!(far.validate().is_err());
    let z = ViewParameters::new("Cube", 2.0, 1000.0, f64::NAN);
    assert_eq!(z.validate().unwrap_err().to_string(), "invalid z position");
  }

  #[test]
  fn numbers_use_a_dot() {
    assert_eq!(script_number(0.5), "0.5");
    assert_eq!(script_number(-12.0), "-12.0");
    assert_eq!(script_number(1e20), "1e20");
  }

  #[test]
  fn context_serializes_only_the_active_reference() {
    let ctx = build(&cube_view(), local("cube.obj"), None, None).unwrap();
    let json = serde_json::to_value(&ctx).unwrap();
    assert!(json.get("texture_reference").is_none());
    assert!(json.get("material_reference").is_none());
    assert_eq!(json["object_reference"], "cube.obj");
  }
}
