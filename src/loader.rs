//! Script fragments that load the mesh into the page.
//!
//! One fragment per render mode. Each takes exactly the references it needs
//! and places each one once, inside a single-quoted load call. The page
//! template provides `THREE`, `OBJLoader`, `MTLLoader`, `DDSLoader`,
//! `manager` (a `LoadingManager` that adds `object` to the scene when every
//! load has finished), `texture`, `onProgress` and `onError`.

use crate::asset::AssetReference;

/// Mesh with no textures.
pub fn plain(object: &AssetReference) -> String {
  format!(
    r#"const loader = new OBJLoader( manager );
      loader.load( '{object}', function ( obj ) {{
        object = obj;
      }}, onProgress, onError );"#,
    object = quote(object.as_str()),
  )
}

/// Mesh with a single image applied to every surface.
pub fn textured(object: &AssetReference, texture: &AssetReference) -> String {
  format!(
    r#"const textureLoader = new THREE.TextureLoader( manager );
      texture = textureLoader.load( '{texture}' );
      const loader = new OBJLoader( manager );
      loader.setCrossOrigin( '' );
      loader.load( '{object}', function ( obj ) {{
        object = obj;
      }}, onProgress, onError );"#,
    texture = quote(texture.as_str()),
    object = quote(object.as_str()),
  )
}

/// Mesh whose surfaces come from a material library.
pub fn material(object: &AssetReference, material: &AssetReference) -> String {
  format!(
    r#"manager.addHandler( /\.dds$/i, new DDSLoader() );
      new MTLLoader( manager )
        .setCrossOrigin( '' )
        .load( '{material}', function ( materials ) {{
          materials.preload();
          new OBJLoader( manager )
            .setMaterials( materials )
            .load( '{object}', function ( obj ) {{
              object = obj;
            }}, onProgress, onError );
        }}, onProgress, onError );"#,
    material = quote(material.as_str()),
    object = quote(object.as_str()),
  )
}

/// Escapes text for a single-quoted JavaScript string.
pub(crate) fn quote(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '\\' => out.push_str("\\\\"),
      '\'' => out.push_str("\\'"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      _ => out.push(c),
    }
  }
  out
}
