use crate::config::toml_config::GeneratorConfig;
use crate::domain::model::GenerationRequest;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "seo-content-gen")]
#[command(about = "Generate SEO keywords and a keyword-rich blog post for a product")]
pub struct CliArgs {
    /// Product name the post is about
    #[arg(short = 'n', long)]
    pub product_name: String,

    /// Optional product description given to the model
    #[arg(short, long)]
    pub description: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory to write the post as Markdown
    #[arg(long)]
    pub output_path: Option<String>,

    /// Copy the finished post to the clipboard
    #[arg(long)]
    pub copy: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliArgs {
    pub fn request(&self) -> GenerationRequest {
        let request = GenerationRequest::new(self.product_name.clone());
        match &self.description {
            Some(description) => request.with_description(description.clone()),
            None => request,
        }
    }

    /// Load the file config (or defaults) and apply command-line overrides.
    pub fn load_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::from_env(),
        };

        if let Some(path) = &self.output_path {
            config.output.output_path = Some(path.clone());
        }
        if self.copy {
            config.output.copy_to_clipboard = true;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args_into_request() {
        let args = CliArgs::parse_from([
            "seo-content-gen",
            "--product-name",
            "Aurora Desk Lamp",
            "--description",
            "Dimmable LED lamp",
            "--copy",
        ]);

        let request = args.request();
        assert_eq!(request.subject_name, "Aurora Desk Lamp");
        assert_eq!(request.description(), Some("Dimmable LED lamp"));
        assert!(args.copy);
        assert!(!args.verbose);
    }

    #[test]
    fn test_cli_overrides_file_config() {
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut temp_file,
            b"[api]\napi_key = \"k\"\n\n[output]\noutput_path = \"./from-file\"\n",
        )
        .unwrap();

        let args = CliArgs::parse_from([
            "seo-content-gen",
            "-n",
            "Lamp",
            "--config",
            temp_file.path().to_str().unwrap(),
            "--output-path",
            "./from-cli",
            "--copy",
        ]);

        let config = args.load_config().unwrap();
        assert_eq!(config.output.output_path.as_deref(), Some("./from-cli"));
        assert!(config.output.copy_to_clipboard);
    }
}
