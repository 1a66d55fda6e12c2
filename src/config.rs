use crate::cli::SplitArgs;
use crate::drive::Credentials;
use crate::error::{Error, Result};

/// Validated settings for one `split` run
#[derive(Debug, Clone)]
pub struct SplitConfig {
    pub file_id: String,
    pub output_folder_id: String,
    pub start_pages: String,
    pub name_prefix: Option<String>,
    pub credentials: Credentials,
    pub dry_run: bool,
}

impl SplitConfig {
    /// Check that every required value is present, then resolve credentials.
    ///
    /// Credential sources are tried in order: access token, inline JSON,
    /// service account key (GDRIVE_SA_KEY), JSON file, metadata server.
    pub fn from_args(args: SplitArgs) -> Result<Self> {
        let file_id = present(args.file_id);
        let output_folder_id = present(args.output_folder_id);
        let start_pages = present(args.start_pages);
        let access_token = present(args.access_token);
        let credentials_json =
            present(args.credentials_json).or_else(|| present(args.service_account_key));
        let has_credentials = access_token.is_some()
            || credentials_json.is_some()
            || args.credentials_file.is_some()
            || args.metadata_server;

        let mut missing = Vec::new();
        if file_id.is_none() {
            missing.push("file id (FILE_ID)");
        }
        if output_folder_id.is_none() {
            missing.push("output folder id (OUTPUT_FOLDER_ID)");
        }
        if start_pages.is_none() {
            missing.push("start pages (START_PAGES)");
        }
        if !has_credentials {
            missing.push("credentials");
        }

        let (Some(file_id), Some(output_folder_id), Some(start_pages), true) =
            (file_id, output_folder_id, start_pages, has_credentials)
        else {
            return Err(Error::MissingConfig(missing));
        };

        let credentials = if let Some(token) = access_token {
            Credentials::AccessToken(token)
        } else if let Some(json) = credentials_json {
            Credentials::from_json(&json)?
        } else if let Some(path) = args.credentials_file {
            Credentials::from_file(path)?
        } else {
            Credentials::MetadataServer
        };

        Ok(SplitConfig {
            file_id,
            output_folder_id,
            start_pages,
            name_prefix: present(args.prefix),
            credentials,
            dry_run: args.dry_run,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
