//! Container image definition for serving the output directory

use shdeps_errors::{Error, OpsError};
use shdeps_store::write_file;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

const DOCKERFILE_TEMPLATE: &str = include_str!("../templates/Dockerfile.tera");

/// Render the bundled Dockerfile template for `output_dir`
///
/// # Errors
///
/// Returns `OpsError::TemplateFailed` if the template cannot be loaded or
/// rendered.
pub fn render_dockerfile(output_dir: &str) -> Result<String, Error> {
    let mut tera = Tera::default();
    tera.add_raw_template("Dockerfile", DOCKERFILE_TEMPLATE)
        .map_err(|e| OpsError::TemplateFailed {
            message: format!("Failed to load template: {e}"),
        })?;

    let mut context = Context::new();
    context.insert("outputDir", output_dir);

    tera.render("Dockerfile", &context).map_err(|e| {
        OpsError::TemplateFailed {
            message: format!("Failed to render template: {e}"),
        }
        .into()
    })
}

/// Write `<output_dir>/Dockerfile`, replacing any previous one
pub(crate) async fn write_dockerfile(output_dir: &Path) -> Result<PathBuf, Error> {
    let path = output_dir.join("Dockerfile");
    let contents = render_dockerfile(&output_dir.display().to_string())?;
    write_file(&path, contents.as_bytes()).await?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_binds_output_dir() {
        let rendered = render_dockerfile("npm").unwrap();
        assert!(rendered.starts_with("FROM nginx:stable-alpine"));
        assert!(rendered.contains("COPY . /usr/share/nginx/html/npm\n"));
        assert!(!rendered.contains("outputDir"));
        // nginx config braces pass through untouched
        assert!(rendered.contains("server {\\n  listen 80;"));
    }

    #[test]
    fn test_render_does_not_escape_paths() {
        let rendered = render_dockerfile("static/npm&co").unwrap();
        assert!(rendered.contains("/usr/share/nginx/html/static/npm&co"));
    }

    #[tokio::test]
    async fn test_write_dockerfile() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("npm");

        let path = write_dockerfile(&dir).await.unwrap();
        assert_eq!(path, dir.join("Dockerfile"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("FROM "));
    }
}
