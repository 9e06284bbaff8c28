//! Template set loading.
//!
//! Every render builds a fresh [`Environment`] from disk, so template edits
//! show up on the next request.

use crate::error::{ViewError, ViewResult};
use crate::funcs::FuncMap;
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Options that apply to every loaded template set.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct LoadOptions {
    /// Fail on any use of an undefined value.
    pub strict_undefined: bool,
}

/// Loads `name` from `root` plus every file directly inside each include
/// path, and registers `funcs` as globals.
///
/// The page is registered under `name`; include files under their file
/// name. Files are added in order, so an include file with the same name
/// as the page replaces it.
pub(crate) fn load_templates(
    root: &Path,
    name: &str,
    include_paths: &[PathBuf],
    funcs: &FuncMap,
    options: LoadOptions,
) -> ViewResult<Environment<'static>> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    if options.strict_undefined {
        env.set_undefined_behavior(UndefinedBehavior::Strict);
    }

    let path = root.join(checked_name(name)?);
    add_file(&mut env, name.to_string(), &path)?;

    for dir in include_paths {
        add_include_dir(&mut env, dir)?;
    }

    for (func_name, func) in funcs {
        env.add_global(func_name.clone(), func.clone());
    }

    Ok(env)
}

/// Rejects names that would resolve outside the template root.
fn checked_name(name: &str) -> ViewResult<&Path> {
    let path = Path::new(name);
    let escapes = path
        .components()
        .any(|c| matches!(c, Component::RootDir | Component::Prefix(_) | Component::ParentDir));
    if escapes {
        return Err(ViewError::InvalidTemplateName {
            name: name.to_string(),
        });
    }
    Ok(path)
}

fn add_file(env: &mut Environment<'static>, name: String, path: &Path) -> ViewResult<()> {
    let source = fs::read_to_string(path).map_err(|source| ViewError::Read {
        path: path.display().to_string(),
        source,
    })?;
    env.add_template_owned(name, source)
        .map_err(|source| ViewError::Parse {
            path: path.display().to_string(),
            source,
        })
}

fn add_include_dir(env: &mut Environment<'static>, dir: &Path) -> ViewResult<()> {
    let read_err = |source| ViewError::Read {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        if entry.file_type().map_err(read_err)?.is_file() {
            files.push(entry.path());
        }
    }
    if files.is_empty() {
        return Err(ViewError::EmptyInclude {
            path: dir.display().to_string(),
        });
    }
    files.sort();

    for path in files {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let name = file_name.to_string_lossy().into_owned();
        add_file(env, name, &path).map_err(|err| ViewError::Include {
            path: dir.display().to_string(),
            source: Box::new(err),
        })?;
    }

    tracing::trace!(include = %dir.display(), "Loaded include path");
    Ok(())
}
