//! Customer image commands.

use std::io::Write;
use std::path::PathBuf;

use clap::Subcommand;
use serde_json::Value;
use stratus_api::client::CreateImage;
use stratus_api::regions;
use stratus_api::types::{OsType, Region};
use stratus_api::ApiClient;

use super::confirm;
use crate::error::CliError;
use crate::output::{gs, list, lookup, Printer, Table};

/// Image subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ImageCommands {
    /// List images.
    #[command(visible_alias = "ls")]
    List {
        /// Maximum number of items to return.
        #[arg(long, default_value_t = 500)]
        limit: u32,
        /// Number of items to skip.
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Show one image.
    Get {
        /// Image UUID.
        id: String,
    },

    /// Create an image from a disk, a URL, or as an upload placeholder.
    #[command(visible_aliases = ["new", "add"])]
    Create {
        /// Image name.
        #[arg(long)]
        name: Option<String>,
        /// Image description.
        #[arg(long)]
        desc: Option<String>,
        /// Source disk to snapshot.
        #[arg(long, conflicts_with = "url")]
        disk_id: Option<i64>,
        /// Pull the image from a URL.
        #[arg(long)]
        url: Option<String>,
        /// OS family of the image.
        #[arg(long)]
        os: Option<OsType>,
        /// Region to store the image in.
        #[arg(long)]
        region: Option<Region>,
    },

    /// Update image name or description.
    #[command(visible_aliases = ["edit", "update", "upd"])]
    Set {
        /// Image UUID.
        id: String,
        /// Image name.
        #[arg(long)]
        name: Option<String>,
        /// Image description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// Upload an image file into an upload placeholder.
    Upload {
        /// Image UUID.
        id: String,
        /// Image file to upload.
        file: PathBuf,
    },

    /// Remove images.
    #[command(visible_alias = "rm")]
    Remove {
        /// Image UUIDs.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Do not ask for confirmation.
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

/// Image command executor.
pub struct ImageCommand<'a> {
    client: &'a ApiClient,
}

impl<'a> ImageCommand<'a> {
    /// Create a new image command.
    #[must_use]
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Execute an image subcommand.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        printer: &Printer,
        command: &ImageCommands,
    ) -> Result<(), CliError> {
        match command {
            ImageCommands::List { limit, offset } => {
                let response = self.client.get_images(*limit, *offset).await?;
                printer.print(writer, &response, render_images)?;
            }
            ImageCommands::Get { id } => {
                let response = self.client.get_image(id).await?;
                printer.print(writer, &response, render_image)?;
            }
            ImageCommands::Create {
                name,
                desc,
                disk_id,
                url,
                os,
                region,
            } => {
                validate_image_region(*region)?;
                let spec = CreateImage {
                    name: name.as_deref(),
                    description: desc.as_deref(),
                    disk_id: *disk_id,
                    upload_url: url.as_deref(),
                    location: *region,
                    os: *os,
                };
                let response = self.client.create_image(&spec).await?;
                printer.print_id(writer, &response, "image.id")?;
            }
            ImageCommands::Set { id, name, desc } => {
                let response = self
                    .client
                    .update_image(id, name.as_deref(), desc.as_deref())
                    .await?;
                printer.print_id(writer, &response, "image.id")?;
            }
            ImageCommands::Upload { id, file } => {
                let response = self.client.upload_image(id, file).await?;
                printer.print_id(writer, &response, "image.id")?;
            }
            ImageCommands::Remove { ids, yes } => {
                confirm(&format!("Remove image(s) {ids:?}?"), *yes)?;
                for id in ids {
                    self.client.delete_image(id).await?;
                    writeln!(writer, "{id}")?;
                }
            }
        }
        Ok(())
    }
}

/// Custom images exist only in a subset of regions.
fn validate_image_region(region: Option<Region>) -> Result<(), CliError> {
    match region {
        Some(region) if !regions::REGIONS_WITH_IMAGES.contains(&region) => {
            Err(CliError::InvalidArgument(format!(
                "images are not available in {region}; supported regions: {}",
                super::region_names(regions::REGIONS_WITH_IMAGES)
            )))
        }
        _ => Ok(()),
    }
}

const IMAGE_HEADER: [&str; 6] = ["UUID", "NAME", "REGION", "STATUS", "DISK", "SIZE (MB)"];

fn image_row(image: &Value, table: &mut Table) -> Result<(), CliError> {
    table.row([
        gs(image, "id")?,
        gs(image, "name").unwrap_or_default(),
        gs(image, "location").unwrap_or_default(),
        gs(image, "status").unwrap_or_default(),
        gs(image, "disk_id").unwrap_or_default(),
        gs(image, "size").unwrap_or_default(),
    ]);
    Ok(())
}

fn render_images(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(IMAGE_HEADER);
    for image in list(value, "images")? {
        image_row(image, table)?;
    }
    Ok(())
}

fn render_image(value: &Value, table: &mut Table) -> Result<(), CliError> {
    table.header(IMAGE_HEADER);
    let image = lookup(value, "image").ok_or_else(|| CliError::MissingField("image".into()))?;
    image_row(image, table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use serde_json::json;

    fn image_command(cli: Cli) -> ImageCommands {
        match cli.command {
            Commands::Image { command } => command,
            _ => panic!("expected image command"),
        }
    }

    #[test]
    fn parses_create_from_disk() {
        let cli = Cli::parse_from([
            "stratus", "image", "create", "--name", "golden", "--disk-id", "100",
        ]);
        match image_command(cli) {
            ImageCommands::Create { name, disk_id, .. } => {
                assert_eq!(name.as_deref(), Some("golden"));
                assert_eq!(disk_id, Some(100));
            }
            _ => panic!("expected create command"),
        }
    }

    #[test]
    fn create_disk_conflicts_with_url() {
        let result = Cli::try_parse_from([
            "stratus",
            "image",
            "create",
            "--disk-id",
            "100",
            "--url",
            "https://example.test/image.qcow2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_upload() {
        let cli = Cli::parse_from(["stratus", "image", "upload", "abc-123", "./disk.qcow2"]);
        match image_command(cli) {
            ImageCommands::Upload { id, file } => {
                assert_eq!(id, "abc-123");
                assert_eq!(file, PathBuf::from("./disk.qcow2"));
            }
            _ => panic!("expected upload command"),
        }
    }

    #[test]
    fn create_rejects_region_without_image_support() {
        let err = validate_image_region(Some(Region::Me1)).unwrap_err();
        assert!(err.to_string().contains("me-1"));
        assert!(validate_image_region(Some(Region::Us1)).is_ok());
        assert!(validate_image_region(None).is_ok());
    }

    #[test]
    fn image_table_renders_uuid_rows() {
        let value = json!({
            "images": [{
                "id": "img-1",
                "name": "golden",
                "location": "us-1",
                "status": "created",
                "disk_id": 100,
                "size": 10240,
            }]
        });
        let mut table = Table::new();
        render_images(&value, &mut table).expect("render");
        let mut buf = Vec::new();
        table.write(&mut buf).expect("write");
        assert!(String::from_utf8(buf).expect("utf8").contains("img-1"));
    }
}
