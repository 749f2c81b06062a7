//! Font loading utilities for the `invoice_pdf` crate.
//!
//! Invoices are usually printed with a single Hangul-capable font.  Hangul fonts rarely ship
//! italic faces, so a font directory only needs the regular and bold files (or one
//! `<family>.ttf`), and a single font file can be used for every style.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Name of the font family searched for in the bundled font directories.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "NotoSansKR";

/// Environment variable pointing at a single font file used for every style.
pub const FONT_FILE_ENV: &str = "INVOICE_PDF_FONT_FILE";

/// Environment variable pointing at a directory containing the default font family.
pub const FONTS_DIR_ENV: &str = "INVOICE_PDF_FONTS_DIR";

/// Environment variable overriding the Windows font directory used as last resort.
pub const WINDOWS_FONTS_DIR_ENV: &str = "INVOICE_PDF_WINDOWS_FONTS_DIR";

/// Styles a directory family must provide; italic faces fall back to these.
const REQUIRED_FONT_STYLES: &[&str] = &["Regular", "Bold"];

const WINDOWS_FALLBACK_FAMILY_NAME: &str = "Malgun Gothic";
const WINDOWS_REGULAR_FONT_FILE: &str = "malgun.ttf";
const WINDOWS_BOLD_FONT_FILE: &str = "malgunbd.ttf";

/// Where the renderer takes its fonts from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FontSource {
    /// Search the environment, the executable directory and the crate assets in that order.
    #[default]
    Auto,
    /// Load `<family>-Regular.ttf` and `<family>-Bold.ttf` (plus optional italic faces) or a
    /// single `<family>.ttf` from `path`.
    Directory { path: PathBuf, family: String },
    /// Use one font file for the regular, bold and italic styles.
    File(PathBuf),
}

impl FontSource {
    /// Shorthand for [`FontSource::Directory`].
    pub fn directory(path: impl Into<PathBuf>, family: impl Into<String>) -> Self {
        Self::Directory {
            path: path.into(),
            family: family.into(),
        }
    }

    /// Shorthand for [`FontSource::File`].
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }
}

/// Returns the `assets/fonts` directory shipped with the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.iter().any(|existing| existing == &candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates
        .iter()
        .any(|existing| existing == &manifest_candidate)
    {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn single_family_file(path: &Path, family: &str) -> PathBuf {
    path.join(format!("{}.ttf", family))
}

fn missing_font_files(path: &Path, family: &str) -> Vec<PathBuf> {
    if single_family_file(path, family).is_file() {
        return Vec::new();
    }
    REQUIRED_FONT_STYLES
        .iter()
        .map(|style| path.join(format!("{}-{}.ttf", family, style)))
        .filter(|candidate| !candidate.is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        let exists = candidate.is_dir();
        let missing = missing_font_files(&candidate, DEFAULT_FONT_FAMILY_NAME);

        if exists && missing.is_empty() {
            return Ok(candidate);
        }

        let reason = if !exists {
            format!("directory missing at {}", candidate.display())
        } else {
            let missing_list = missing
                .iter()
                .map(|path| path.file_name().unwrap_or_default().to_string_lossy())
                .collect::<Vec<_>>()
                .join(", ");
            format!("missing files [{}]", missing_list)
        };

        attempts.push(format!("{} ({})", candidate.display(), reason));
    }

    let summary = if attempts.is_empty() {
        "no search paths were available".to_owned()
    } else {
        attempts.join(", ")
    };

    Err(Error::new(
        format!(
            "Unable to locate the invoice font directory. Checked: {}. See assets/fonts/README.md or set {} or {}.",
            summary, FONT_FILE_ENV, FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "invoice fonts directory not found"),
    ))
}

fn load_font_file(path: &Path) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        let io_kind = if path.is_file() {
            io::ErrorKind::Other
        } else {
            io::ErrorKind::NotFound
        };
        Error::new(
            format!("Failed to load font file {}: {}", path.display(), err),
            io::Error::new(io_kind, err.to_string()),
        )
    })
}

/// Loads an optional face, falling back to `fallback` when the file does not exist.
fn load_optional_font_file(path: &Path, fallback: &FontData) -> Result<FontData, Error> {
    if path.is_file() {
        load_font_file(path)
    } else {
        debug!("{} not found; reusing the upright face", path.display());
        Ok(fallback.clone())
    }
}

fn load_directory_family(directory: &Path, family: &str) -> Result<FontFamily<FontData>, Error> {
    let single = single_family_file(directory, family);
    if single.is_file() {
        return load_single_file_family(&single);
    }

    debug!("Loading font family '{}' from {}", family, directory.display());
    let face = |style: &str| directory.join(format!("{}-{}.ttf", family, style));
    let regular = load_font_file(&face("Regular"))?;
    let bold = load_font_file(&face("Bold"))?;
    let italic = load_optional_font_file(&face("Italic"), &regular)?;
    let bold_italic = load_optional_font_file(&face("BoldItalic"), &bold)?;
    Ok(FontFamily {
        regular,
        bold,
        italic,
        bold_italic,
    })
}

fn load_single_file_family(path: &Path) -> Result<FontFamily<FontData>, Error> {
    debug!("Loading single-file font family from {}", path.display());
    let data = load_font_file(path)?;
    Ok(FontFamily {
        regular: data.clone(),
        bold: data.clone(),
        italic: data.clone(),
        bold_italic: data,
    })
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path(WINDOWS_FONTS_DIR_ENV) {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

/// Loads Malgun Gothic, the Hangul font shipped with Windows.  It has no italic faces.
fn windows_fallback_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = windows_font_directory().ok_or_else(|| {
        Error::new(
            "Windows font directory not found for fallback",
            io::Error::new(io::ErrorKind::NotFound, "windows fonts directory not found"),
        )
    })?;

    let regular = load_font_file(&directory.join(WINDOWS_REGULAR_FONT_FILE))?;
    let bold = load_optional_font_file(&directory.join(WINDOWS_BOLD_FONT_FILE), &regular)?;
    Ok(FontFamily {
        italic: regular.clone(),
        bold_italic: bold.clone(),
        regular,
        bold,
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

fn auto_font_family() -> Result<FontFamily<FontData>, Error> {
    if let Some(path) = env_path(FONT_FILE_ENV) {
        return load_single_file_family(&path);
    }

    let searched =
        resolve_font_directory().and_then(|dir| load_directory_family(&dir, DEFAULT_FONT_FAMILY_NAME));

    match searched {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match windows_fallback_font_family() {
            Ok(fallback) => {
                warn!(
                    "Invoice fonts unavailable ({}); falling back to Windows '{}' family.",
                    err, WINDOWS_FALLBACK_FAMILY_NAME
                );
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Invoice fonts unavailable ({}); Windows fallback failed: {}",
                    err, fallback_err
                );
                Err(Error::new(
                    format!(
                        "Invoice fonts unavailable and Windows fallback failed: {}",
                        fallback_err
                    ),
                    io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Loads the font family described by `source`.
pub fn load_font_family(source: &FontSource) -> Result<FontFamily<FontData>, Error> {
    match source {
        FontSource::Auto => auto_font_family(),
        FontSource::Directory { path, family } => load_directory_family(path, family),
        FontSource::File(path) => load_single_file_family(path),
    }
}

/// Indicates whether [`FontSource::Auto`] would find fonts without the Windows fallback.
pub fn default_fonts_available() -> bool {
    match env_path(FONT_FILE_ENV) {
        Some(path) => path.is_file(),
        None => resolve_font_directory().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/Library/Fonts/Arial Unicode.ttf",
        "C:\\Windows\\Fonts\\malgun.ttf",
    ];

    fn system_font() -> Option<PathBuf> {
        SYSTEM_FONTS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    #[test]
    fn missing_files_follow_family_naming() {
        let dir = PathBuf::from("/__invoice_pdf_no_such_dir__");
        let missing = missing_font_files(&dir, "Demo");
        let names: Vec<_> = missing
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Demo-Regular.ttf", "Demo-Bold.ttf"]);
    }

    #[test]
    fn single_family_file_satisfies_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Demo.ttf"), b"placeholder").expect("write font");
        assert!(missing_font_files(dir.path(), "Demo").is_empty());
    }

    #[test]
    fn directory_without_italic_faces_loads() {
        let Some(font) = system_font() else {
            eprintln!("Skipping directory_without_italic_faces_loads: no system font found");
            return;
        };
        let dir = tempfile::tempdir().expect("temp dir");
        for style in REQUIRED_FONT_STYLES {
            fs::copy(&font, dir.path().join(format!("Demo-{}.ttf", style))).expect("copy font");
        }
        assert!(missing_font_files(dir.path(), "Demo").is_empty());
        load_font_family(&FontSource::directory(dir.path(), "Demo"))
            .expect("regular and bold faces are enough");
    }

    #[test]
    fn directory_with_one_family_file_loads() {
        let Some(font) = system_font() else {
            eprintln!("Skipping directory_with_one_family_file_loads: no system font found");
            return;
        };
        let dir = tempfile::tempdir().expect("temp dir");
        fs::copy(&font, dir.path().join("Demo.ttf")).expect("copy font");
        load_font_family(&FontSource::directory(dir.path(), "Demo"))
            .expect("single family file is used for every style");
    }

    #[test]
    fn missing_single_file_reports_not_found() {
        let err = load_font_family(&FontSource::file("/__invoice_pdf_missing__.ttf")).unwrap_err();
        assert!(fonts_missing(&err));
    }

    #[test]
    fn missing_directory_reports_not_found() {
        let err = load_font_family(&FontSource::directory("/__invoice_pdf_missing__", "Demo"))
            .unwrap_err();
        assert!(fonts_missing(&err));
    }
}
