use std::path::{Path, PathBuf};

use minijinja::{context, Environment};
use nu_ansi_term::Color::{Cyan, Green};
use repokit_config::config::Config;
use repokit_utils::{
    error::FileSystemError,
    fs::{ensure_dir_exists, read_to_string, write_new_file},
    string::{is_type_name, last_path_segment, to_snake_case},
};
use tracing::{debug, info};

use crate::{
    error::{CliError, CliResult},
    utils::Colored,
};

const REPOSITORY_TEMPLATE: &str = include_str!("../templates/repository.rs.jinja");
const INTERFACE_TEMPLATE: &str = include_str!("../templates/interface.rs.jinja");

/// Resolved directories, module paths and template overrides the generator
/// works against.
#[derive(Debug, Clone)]
pub struct Layout {
    pub models_dir: PathBuf,
    pub repositories_dir: PathBuf,
    pub interfaces_dir: PathBuf,
    pub models_module: String,
    pub interfaces_module: String,
    pub repository_template: Option<PathBuf>,
    pub interface_template: Option<PathBuf>,
}

impl Layout {
    pub fn from_config(config: &Config) -> CliResult<Self> {
        Ok(Self {
            models_dir: config.get_models_path()?,
            repositories_dir: config.get_repositories_path()?,
            interfaces_dir: config.get_interfaces_path()?,
            models_module: config.models_module(),
            interfaces_module: config.interfaces_module(),
            repository_template: config.get_repository_template()?,
            interface_template: config.get_interface_template()?,
        })
    }
}

struct Output {
    path: PathBuf,
    template_name: &'static str,
    source: String,
}

fn load_template(
    name: &'static str,
    override_path: Option<&Path>,
    builtin: &str,
) -> CliResult<String> {
    match override_path {
        Some(path) => {
            debug!("using {name} template override at {}", path.display());
            Ok(read_to_string(path)?)
        }
        None => Ok(builtin.to_string()),
    }
}

fn render(name: &str, source: &str, ctx: minijinja::Value) -> CliResult<String> {
    let env = Environment::new();
    let template_error = |source| {
        CliError::Template {
            name: name.to_string(),
            source,
        }
    };

    let template = env.template_from_str(source).map_err(template_error)?;
    let mut rendered = template.render(ctx).map_err(template_error)?;
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

fn find_model_file(models_dir: &Path, snake: &str) -> Option<PathBuf> {
    [
        models_dir.join(format!("{snake}.rs")),
        models_dir.join(snake).join("mod.rs"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_file())
}

/// Scaffolds the repository for `model`, and its trait when `interface` is
/// set. Returns the written files in write order.
///
/// Nothing is written unless the model exists and every destination is free.
pub fn make_repository(layout: &Layout, model: &str, interface: bool) -> CliResult<Vec<PathBuf>> {
    let name = last_path_segment(model.trim());
    if !is_type_name(name) {
        return Err(CliError::InvalidModelName(model.to_string()));
    }
    let snake = to_snake_case(name);

    if find_model_file(&layout.models_dir, &snake).is_none() {
        return Err(CliError::ModelNotFound {
            model: name.to_string(),
            path: layout.models_dir.join(format!("{snake}.rs")),
        });
    }

    let mut outputs = Vec::with_capacity(2);
    if interface {
        outputs.push(Output {
            path: layout
                .interfaces_dir
                .join(format!("{snake}_repository_interface.rs")),
            template_name: "interface",
            source: load_template(
                "interface",
                layout.interface_template.as_deref(),
                INTERFACE_TEMPLATE,
            )?,
        });
    }
    outputs.push(Output {
        path: layout
            .repositories_dir
            .join(format!("{snake}_repository.rs")),
        template_name: "repository",
        source: load_template(
            "repository",
            layout.repository_template.as_deref(),
            REPOSITORY_TEMPLATE,
        )?,
    });

    if let Some(existing) = outputs.iter().find(|output| output.path.exists()) {
        return Err(FileSystemError::AlreadyExists {
            path: existing.path.clone(),
        }
        .into());
    }

    let ctx = context! {
        model => name,
        snake => &snake,
        models_module => &layout.models_module,
        interfaces_module => &layout.interfaces_module,
        interface => interface,
    };

    // Render everything before touching the disk so a template error leaves
    // no partial output behind.
    let rendered = outputs
        .iter()
        .map(|output| render(output.template_name, &output.source, ctx.clone()))
        .collect::<CliResult<Vec<_>>>()?;

    let mut written = Vec::with_capacity(outputs.len());
    for (output, contents) in outputs.iter().zip(rendered) {
        if let Some(parent) = output.path.parent() {
            ensure_dir_exists(parent)?;
        }
        write_new_file(&output.path, &contents)?;
        info!(
            "{} {}",
            Colored(Green, "Created"),
            Colored(Cyan, output.path.display())
        );
        written.push(output.path.clone());
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::{tempdir, TempDir};

    use super::*;

    fn layout(dir: &TempDir) -> Layout {
        let base = dir.path();
        Layout {
            models_dir: base.join("models"),
            repositories_dir: base.join("repositories"),
            interfaces_dir: base.join("repositories/interfaces"),
            models_module: "crate::models".into(),
            interfaces_module: "crate::repositories::interfaces".into(),
            repository_template: None,
            interface_template: None,
        }
    }

    fn add_model(layout: &Layout, file: &str) {
        let path = layout.models_dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "pub struct Model;\n").unwrap();
    }

    #[test]
    fn test_generates_repository() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);
        add_model(&layout, "blog_post.rs");

        let written = make_repository(&layout, "BlogPost", false).unwrap();
        let expected = layout.repositories_dir.join("blog_post_repository.rs");
        assert_eq!(written, vec![expected.clone()]);

        let source = fs::read_to_string(expected).unwrap();
        assert!(source.contains("use crate::models::BlogPost;"));
        assert!(source.contains("pub struct BlogPostRepository"));
        assert!(source.contains("EntityRepository<BlogPost>"));
        assert!(source.contains("const MODEL: &'static str = \"crate::models::BlogPost\";"));
        assert!(!source.contains("RepositoryInterface"));
    }

    #[test]
    fn test_accepts_module_dir_and_path_prefix() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);
        add_model(&layout, "user/mod.rs");

        let written = make_repository(&layout, "crate::models::User", false).unwrap();
        assert_eq!(
            written,
            vec![layout.repositories_dir.join("user_repository.rs")]
        );
    }

    #[test]
    fn test_missing_model_writes_nothing() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);

        let err = make_repository(&layout, "Ghost", false).unwrap_err();
        assert!(matches!(err, CliError::ModelNotFound { ref model, .. } if model == "Ghost"));
        assert!(!layout.repositories_dir.exists());
    }

    #[test]
    fn test_invalid_model_name() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);

        for name in ["user", "Blog-Post", ""] {
            let err = make_repository(&layout, name, false).unwrap_err();
            assert!(matches!(err, CliError::InvalidModelName(_)), "{name}");
        }
    }

    #[test]
    fn test_existing_repository_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);
        add_model(&layout, "user.rs");

        let dest = layout.repositories_dir.join("user_repository.rs");
        fs::create_dir_all(&layout.repositories_dir).unwrap();
        fs::write(&dest, "// hand written\n").unwrap();

        let err = make_repository(&layout, "User", false).unwrap_err();
        assert!(matches!(
            err,
            CliError::FileSystem(FileSystemError::AlreadyExists { .. })
        ));
        assert_eq!(fs::read_to_string(dest).unwrap(), "// hand written\n");
    }

    #[test]
    fn test_existing_repository_blocks_interface_too() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);
        add_model(&layout, "user.rs");
        fs::create_dir_all(&layout.repositories_dir).unwrap();
        fs::write(layout.repositories_dir.join("user_repository.rs"), "").unwrap();

        assert!(make_repository(&layout, "User", true).is_err());
        assert!(!layout
            .interfaces_dir
            .join("user_repository_interface.rs")
            .exists());
    }

    #[test]
    fn test_generates_interface() {
        let dir = tempdir().unwrap();
        let layout = layout(&dir);
        add_model(&layout, "user.rs");

        let written = make_repository(&layout, "User", true).unwrap();
        let interface = layout.interfaces_dir.join("user_repository_interface.rs");
        let repository = layout.repositories_dir.join("user_repository.rs");
        assert_eq!(written, vec![interface.clone(), repository.clone()]);

        let trait_source = fs::read_to_string(interface).unwrap();
        assert!(trait_source.contains("pub trait UserRepositoryInterface"));
        assert!(trait_source.contains("fn get_by_id(&self, id: Value) -> Result<Option<User>>;"));

        let repo_source = fs::read_to_string(repository).unwrap();
        assert!(repo_source.contains(
            "use crate::repositories::interfaces::user_repository_interface::UserRepositoryInterface;"
        ));
        assert!(repo_source.contains("impl UserRepositoryInterface for UserRepository"));
    }

    #[test]
    fn test_template_override() {
        let dir = tempdir().unwrap();
        let mut layout = layout(&dir);
        add_model(&layout, "user.rs");

        let template = dir.path().join("custom.jinja");
        fs::write(&template, "// {{ model }} in {{ models_module }}").unwrap();
        layout.repository_template = Some(template);

        let written = make_repository(&layout, "User", false).unwrap();
        assert_eq!(
            fs::read_to_string(&written[0]).unwrap(),
            "// User in crate::models\n"
        );
    }

    #[test]
    fn test_broken_template_writes_nothing() {
        let dir = tempdir().unwrap();
        let mut layout = layout(&dir);
        add_model(&layout, "user.rs");

        let template = dir.path().join("broken.jinja");
        fs::write(&template, "{% if %}").unwrap();
        layout.repository_template = Some(template);

        let err = make_repository(&layout, "User", false).unwrap_err();
        assert!(matches!(err, CliError::Template { .. }));
        assert!(!layout.repositories_dir.exists());
    }
}
