//! HTTP client for the Stratus Cloud REST API.
//!
//! One method per documented endpoint, all funneled through a single send
//! path that attaches authentication, logs the exchange with the token
//! redacted, and maps non-2xx statuses onto [`Error`].
//!
//! # Example
//!
//! ```rust,no_run
//! use stratus_api::ApiClient;
//!
//! # async fn example() -> Result<(), stratus_api::Error> {
//! let client = ApiClient::new("my-api-token")?;
//! let servers = client.get_servers(100, 0).await?.json()?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::Error;
use crate::types::{
    AvailabilityZone, BackupAction, BackupInterval, BalancerAlgo, BalancerProto, BootMode,
    DatabaseEngine, DnsRecordType, FirewallDirection, FirewallProto, IpVersion, LogOrder, NatMode,
    OsType, Region, ResourceType, ServerAction, ServerConfiguration,
};

/// Production API endpoint.
pub const API_BASE_URL: &str = "https://api.stratus.cloud";

const API_PATH_V1: &str = "/api/v1";
const API_PATH_V2: &str = "/api/v2";

/// Default request timeout. The API can be slow on provisioning calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// A successful API response: status plus the raw body text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    body: String,
}

impl ApiResponse {
    /// Build a response from parts. Lets callers feed canned bodies through
    /// the same rendering paths as live responses.
    #[must_use]
    pub fn from_parts(status: u16, body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
            body: body.into(),
        }
    }

    /// HTTP status of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw response body (mostly raw JSON).
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<Value, Error> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::MalformedResponse(format!("invalid JSON body: {e}")))
    }
}

/// Stratus Cloud API client.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client against the production endpoint.
    pub fn new(token: impl Into<String>) -> Result<Self, Error> {
        Self::with_base_url(token, API_BASE_URL)
    }

    /// Create a client against a custom endpoint (testing, staging).
    pub fn with_base_url(
        token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("stratus-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// The configured API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn v1(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH_V1, path)
    }

    fn v2(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PATH_V2, path)
    }

    /// Send one request and handle errors. The token is never logged.
    async fn send(
        &self,
        method: Method,
        url: String,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<ApiResponse, Error> {
        debug!(method = %method, url = %url, "sending API request");

        let mut request = self.http.request(method, &url).bearer_auth(&self.token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            debug!(status = status.as_u16(), "API request succeeded");
            Ok(ApiResponse { status, body: text })
        } else {
            // Always log the body on errors.
            debug!(status = status.as_u16(), body = %text, "API request failed");
            Err(Error::from_response(status.as_u16(), &text))
        }
    }

    async fn get(&self, url: String) -> Result<ApiResponse, Error> {
        self.send(Method::GET, url, &[], None).await
    }

    async fn get_query(
        &self,
        url: String,
        query: &[(&str, String)],
    ) -> Result<ApiResponse, Error> {
        self.send(Method::GET, url, query, None).await
    }

    async fn post(&self, url: String, body: Value) -> Result<ApiResponse, Error> {
        self.send(Method::POST, url, &[], Some(body)).await
    }

    async fn patch(&self, url: String, body: Value) -> Result<ApiResponse, Error> {
        self.send(Method::PATCH, url, &[], Some(body)).await
    }

    async fn put(&self, url: String, body: Option<Value>) -> Result<ApiResponse, Error> {
        self.send(Method::PUT, url, &[], body).await
    }

    async fn delete(&self, url: String) -> Result<ApiResponse, Error> {
        self.send(Method::DELETE, url, &[], None).await
    }

    async fn delete_json(&self, url: String, body: Value) -> Result<ApiResponse, Error> {
        self.send(Method::DELETE, url, &[], Some(body)).await
    }

    // ========================================================================
    // Account Operations
    // ========================================================================

    /// Get account status.
    pub async fn get_account_status(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/account/status")).await
    }

    /// Get account finances.
    pub async fn get_account_finances(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/account/finances")).await
    }

    /// Get account restrictions.
    pub async fn get_account_restrictions(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/auth/access")).await
    }

    // ========================================================================
    // Server Operations
    // ========================================================================

    /// List Cloud Servers.
    pub async fn get_servers(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/servers"), &paging(limit, offset)).await
    }

    /// Get Cloud Server by ID.
    pub async fn get_server(&self, server_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/servers/{server_id}"))).await
    }

    /// Create a new Cloud Server.
    ///
    /// `configuration` and `preset_id` are mutually exclusive, as are
    /// `os_id` and `image_id`; the payload struct enforces presence of one
    /// of each pair.
    pub async fn create_server(&self, spec: &CreateServer) -> Result<ApiResponse, Error> {
        if spec.configuration.is_none() && spec.preset_id.is_none() {
            return Err(Error::MalformedResponse(
                "one of parameters is required: configuration, preset_id".into(),
            ));
        }
        if spec.os_id.is_none() && spec.image_id.is_none() {
            return Err(Error::MalformedResponse(
                "one of parameters is required: os_id, image_id".into(),
            ));
        }
        self.post(self.v1("/servers"), to_value(spec)?).await
    }

    /// Update Cloud Server properties.
    pub async fn update_server(
        &self,
        server_id: i64,
        spec: &UpdateServer,
    ) -> Result<ApiResponse, Error> {
        self.patch(self.v1(&format!("/servers/{server_id}")), to_value(spec)?)
            .await
    }

    /// Delete Cloud Server. The API returns HTTP 204 on success.
    pub async fn delete_server(&self, server_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/servers/{server_id}"))).await
    }

    /// Perform an action on a Cloud Server. The API returns HTTP 204.
    pub async fn do_server_action(
        &self,
        server_id: i64,
        action: ServerAction,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/servers/{server_id}/action")),
            json!({ "action": action }),
        )
        .await
    }

    /// Clone a Cloud Server. Returns the clone object.
    pub async fn clone_server(&self, server_id: i64) -> Result<ApiResponse, Error> {
        self.post(self.v1(&format!("/servers/{server_id}/clone")), json!({}))
            .await
    }

    /// List fixed server presets.
    pub async fn get_server_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/servers")).await
    }

    /// List server configurators (custom sizing constraints).
    pub async fn get_server_configurators(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/configurator/servers")).await
    }

    /// List installable operating system images.
    pub async fn get_server_os_images(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/os/servers")).await
    }

    /// List installable software bundles.
    pub async fn get_server_software(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/software/servers")).await
    }

    /// Get the server event log.
    pub async fn get_server_logs(
        &self,
        server_id: i64,
        limit: u32,
        order: LogOrder,
    ) -> Result<ApiResponse, Error> {
        self.get_query(
            self.v1(&format!("/servers/{server_id}/logs")),
            &[("limit", limit.to_string()), ("order", order.to_string())],
        )
        .await
    }

    /// Set the server boot mode.
    pub async fn set_server_boot_mode(
        &self,
        server_id: i64,
        boot_mode: BootMode,
    ) -> Result<ApiResponse, Error> {
        // CLI shortcut 'recovery' is named 'recovery_disk' on the wire.
        let wire = match boot_mode {
            BootMode::Recovery => "recovery_disk",
            other => other.as_str(),
        };
        self.post(
            self.v1(&format!("/servers/{server_id}/boot-mode")),
            json!({ "boot_mode": wire }),
        )
        .await
    }

    /// Set the NAT mode for a LAN-attached server.
    pub async fn set_server_nat_mode(
        &self,
        server_id: i64,
        nat_mode: NatMode,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/servers/{server_id}/local-networks/nat-mode")),
            json!({ "nat_mode": nat_mode }),
        )
        .await
    }

    // ========================================================================
    // Server IP Operations
    // ========================================================================

    /// List IP addresses attached to a server.
    pub async fn get_server_ips(&self, server_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/servers/{server_id}/ips"))).await
    }

    /// Attach a new IP address to a server.
    pub async fn add_server_ip(
        &self,
        server_id: i64,
        version: IpVersion,
        ptr: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({ "type": version });
        if let Some(ptr) = ptr {
            payload["ptr"] = json!(ptr);
        }
        self.post(self.v1(&format!("/servers/{server_id}/ips")), payload)
            .await
    }

    /// Remove an IP address from a server.
    pub async fn delete_server_ip(&self, server_id: i64, ip: &str) -> Result<ApiResponse, Error> {
        self.delete_json(
            self.v1(&format!("/servers/{server_id}/ips")),
            json!({ "ip": ip }),
        )
        .await
    }

    /// Update the PTR record of an attached IP address.
    pub async fn update_server_ip(
        &self,
        server_id: i64,
        ip: &str,
        ptr: &str,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/servers/{server_id}/ips")),
            json!({ "ip": ip, "ptr": ptr }),
        )
        .await
    }

    // ========================================================================
    // Server Disk Operations
    // ========================================================================

    /// List server disks.
    pub async fn get_disks(&self, server_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/servers/{server_id}/disks"))).await
    }

    /// Get one server disk.
    pub async fn get_disk(&self, server_id: i64, disk_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/servers/{server_id}/disks/{disk_id}")))
            .await
    }

    /// Add a disk to a server. `size` is in megabytes.
    pub async fn add_disk(&self, server_id: i64, size: i64) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/servers/{server_id}/disks")),
            json!({ "size": size }),
        )
        .await
    }

    /// Resize a server disk. `size` is in megabytes.
    pub async fn update_disk(
        &self,
        server_id: i64,
        disk_id: i64,
        size: i64,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/servers/{server_id}/disks/{disk_id}")),
            json!({ "size": size }),
        )
        .await
    }

    /// Remove a disk from a server.
    pub async fn delete_disk(&self, server_id: i64, disk_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/servers/{server_id}/disks/{disk_id}")))
            .await
    }

    // ========================================================================
    // Disk Backup Operations
    // ========================================================================

    /// Get disk auto-backup settings.
    pub async fn get_disk_autobackup_settings(
        &self,
        server_id: i64,
        disk_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!(
            "/servers/{server_id}/disks/{disk_id}/auto-backups"
        )))
        .await
    }

    /// Update disk auto-backup settings.
    pub async fn update_disk_autobackup_settings(
        &self,
        server_id: i64,
        disk_id: i64,
        settings: &AutoBackupSettings,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!(
                "/servers/{server_id}/disks/{disk_id}/auto-backups"
            )),
            to_value(settings)?,
        )
        .await
    }

    /// List disk backups.
    pub async fn get_disk_backups(
        &self,
        server_id: i64,
        disk_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/servers/{server_id}/disks/{disk_id}/backups")))
            .await
    }

    /// Get one disk backup.
    pub async fn get_disk_backup(
        &self,
        server_id: i64,
        disk_id: i64,
        backup_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!(
            "/servers/{server_id}/disks/{disk_id}/backups/{backup_id}"
        )))
        .await
    }

    /// Create a disk backup.
    pub async fn create_disk_backup(
        &self,
        server_id: i64,
        disk_id: i64,
        comment: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(comment) = comment {
            payload["comment"] = json!(comment);
        }
        self.post(
            self.v1(&format!("/servers/{server_id}/disks/{disk_id}/backups")),
            payload,
        )
        .await
    }

    /// Update a disk backup comment.
    pub async fn update_disk_backup(
        &self,
        server_id: i64,
        disk_id: i64,
        backup_id: i64,
        comment: &str,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!(
                "/servers/{server_id}/disks/{disk_id}/backups/{backup_id}"
            )),
            json!({ "comment": comment }),
        )
        .await
    }

    /// Delete a disk backup.
    pub async fn delete_disk_backup(
        &self,
        server_id: i64,
        disk_id: i64,
        backup_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!(
            "/servers/{server_id}/disks/{disk_id}/backups/{backup_id}"
        )))
        .await
    }

    /// Perform an action (restore/mount/unmount) on a disk backup.
    pub async fn do_disk_backup_action(
        &self,
        server_id: i64,
        disk_id: i64,
        backup_id: i64,
        action: BackupAction,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!(
                "/servers/{server_id}/disks/{disk_id}/backups/{backup_id}/action"
            )),
            json!({ "action": action }),
        )
        .await
    }

    // ========================================================================
    // SSH Key Operations
    // ========================================================================

    /// List SSH keys.
    pub async fn get_ssh_keys(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/ssh-keys")).await
    }

    /// Get one SSH key.
    pub async fn get_ssh_key(&self, ssh_key_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/ssh-keys/{ssh_key_id}"))).await
    }

    /// Upload a new SSH public key.
    pub async fn add_ssh_key(
        &self,
        name: &str,
        body: &str,
        is_default: bool,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1("/ssh-keys"),
            json!({ "name": name, "body": body, "is_default": is_default }),
        )
        .await
    }

    /// Update an SSH key and its properties.
    pub async fn update_ssh_key(
        &self,
        ssh_key_id: i64,
        name: Option<&str>,
        body: Option<&str>,
        is_default: Option<bool>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(name) = name {
            payload["name"] = json!(name);
        }
        if let Some(body) = body {
            payload["body"] = json!(body);
        }
        if let Some(is_default) = is_default {
            payload["is_default"] = json!(is_default);
        }
        self.patch(self.v1(&format!("/ssh-keys/{ssh_key_id}")), payload)
            .await
    }

    /// Delete an SSH key. The API returns HTTP 204.
    pub async fn delete_ssh_key(&self, ssh_key_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/ssh-keys/{ssh_key_id}"))).await
    }

    /// Copy SSH keys to a Cloud Server. The API returns HTTP 204.
    pub async fn add_ssh_keys_to_server(
        &self,
        server_id: i64,
        ssh_key_ids: &[i64],
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/servers/{server_id}/ssh-keys")),
            json!({ "ssh_key_ids": ssh_key_ids }),
        )
        .await
    }

    /// Remove an SSH key from a Cloud Server. The API returns HTTP 204.
    pub async fn delete_ssh_key_from_server(
        &self,
        server_id: i64,
        ssh_key_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/servers/{server_id}/ssh-keys/{ssh_key_id}")))
            .await
    }

    // ========================================================================
    // Image Operations
    // ========================================================================

    /// List customer images.
    pub async fn get_images(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/images"), &paging(limit, offset)).await
    }

    /// Get one image.
    pub async fn get_image(&self, image_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/images/{image_id}"))).await
    }

    /// Create an image, either from a disk or as an upload placeholder.
    pub async fn create_image(&self, spec: &CreateImage<'_>) -> Result<ApiResponse, Error> {
        self.post(self.v1("/images"), to_value(spec)?).await
    }

    /// Update image metadata.
    pub async fn update_image(
        &self,
        image_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(name) = name {
            payload["name"] = json!(name);
        }
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        self.patch(self.v1(&format!("/images/{image_id}")), payload)
            .await
    }

    /// Upload an image file into an upload placeholder.
    pub async fn upload_image(&self, image_id: &str, filename: &Path) -> Result<ApiResponse, Error> {
        let url = self.v1(&format!("/images/{image_id}"));
        debug!(url = %url, file = %filename.display(), "uploading image");

        let file = std::fs::read(filename).map_err(|e| {
            Error::MalformedResponse(format!("cannot read {}: {e}", filename.display()))
        })?;
        let part = reqwest::multipart::Part::bytes(file).file_name(
            filename
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string()),
        );
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(ApiResponse { status, body: text })
        } else {
            Err(Error::from_response(status.as_u16(), &text))
        }
    }

    /// Delete an image.
    pub async fn delete_image(&self, image_id: &str) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/images/{image_id}"))).await
    }

    // ========================================================================
    // Project Operations
    // ========================================================================

    /// List projects.
    pub async fn get_projects(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/projects")).await
    }

    /// Get one project.
    pub async fn get_project(&self, project_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/projects/{project_id}"))).await
    }

    /// Create a project.
    pub async fn create_project(
        &self,
        name: &str,
        description: Option<&str>,
        avatar_id: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({ "name": name });
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        if let Some(avatar_id) = avatar_id {
            payload["avatar_id"] = json!(avatar_id);
        }
        self.post(self.v1("/projects"), payload).await
    }

    /// Update a project.
    pub async fn update_project(
        &self,
        project_id: i64,
        name: Option<&str>,
        description: Option<&str>,
        avatar_id: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(name) = name {
            payload["name"] = json!(name);
        }
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        if let Some(avatar_id) = avatar_id {
            payload["avatar_id"] = json!(avatar_id);
        }
        self.patch(self.v1(&format!("/projects/{project_id}")), payload)
            .await
    }

    /// Delete a project. Resources move to the default project.
    pub async fn delete_project(&self, project_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/projects/{project_id}"))).await
    }

    /// List all resources in a project.
    pub async fn get_project_resources(&self, project_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/projects/{project_id}/resources")))
            .await
    }

    /// Move a resource between projects.
    pub async fn move_resource_to_project(
        &self,
        from_project: i64,
        to_project: i64,
        resource_id: i64,
        resource_type: ResourceType,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/projects/{from_project}/resources/transfer")),
            json!({
                "to_project": to_project,
                "resource_id": resource_id,
                "resource_type": resource_type,
            }),
        )
        .await
    }

    // ========================================================================
    // Database Operations
    // ========================================================================

    /// List managed databases.
    pub async fn get_databases(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/dbs"), &paging(limit, offset)).await
    }

    /// Get one managed database.
    pub async fn get_database(&self, db_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/dbs/{db_id}"))).await
    }

    /// List database presets.
    pub async fn get_database_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/dbs")).await
    }

    /// List available database engine versions.
    pub async fn get_database_types(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/database-types")).await
    }

    /// Create a managed database.
    pub async fn create_database(&self, spec: &CreateDatabase<'_>) -> Result<ApiResponse, Error> {
        self.post(self.v1("/dbs"), to_value(spec)?).await
    }

    /// Update a managed database.
    pub async fn update_database(
        &self,
        db_id: i64,
        spec: &UpdateDatabase<'_>,
    ) -> Result<ApiResponse, Error> {
        self.patch(self.v1(&format!("/dbs/{db_id}")), to_value(spec)?)
            .await
    }

    /// Delete a managed database.
    pub async fn delete_database(&self, db_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/dbs/{db_id}"))).await
    }

    /// List database backups.
    pub async fn get_database_backups(
        &self,
        db_id: i64,
        limit: u32,
        offset: u32,
    ) -> Result<ApiResponse, Error> {
        self.get_query(
            self.v1(&format!("/dbs/{db_id}/backups")),
            &paging(limit, offset),
        )
        .await
    }

    /// Create a database backup.
    pub async fn create_database_backup(&self, db_id: i64) -> Result<ApiResponse, Error> {
        // The endpoint requires an empty JSON body.
        self.post(self.v1(&format!("/dbs/{db_id}/backups")), json!({}))
            .await
    }

    /// Delete a database backup.
    pub async fn delete_database_backup(
        &self,
        db_id: i64,
        backup_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/dbs/{db_id}/backups/{backup_id}")))
            .await
    }

    /// Restore a database backup.
    pub async fn restore_database_backup(
        &self,
        db_id: i64,
        backup_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.put(self.v1(&format!("/dbs/{db_id}/backups/{backup_id}")), None)
            .await
    }

    /// Get database auto-backup settings.
    pub async fn get_database_autobackup_settings(
        &self,
        db_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/dbs/{db_id}/auto-backups"))).await
    }

    /// Update database auto-backup settings.
    pub async fn update_database_autobackup_settings(
        &self,
        db_id: i64,
        settings: &AutoBackupSettings,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/dbs/{db_id}/auto-backups")),
            to_value(settings)?,
        )
        .await
    }

    // ========================================================================
    // Object Storage Operations
    // ========================================================================

    /// List storage presets.
    pub async fn get_storage_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/storages")).await
    }

    /// List buckets.
    pub async fn get_buckets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/storages/buckets")).await
    }

    /// Create a bucket.
    pub async fn create_bucket(
        &self,
        name: &str,
        preset_id: i64,
        is_public: bool,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1("/storages/buckets"),
            json!({
                "name": name,
                "preset_id": preset_id,
                "type": if is_public { "public" } else { "private" },
            }),
        )
        .await
    }

    /// Delete a bucket.
    pub async fn delete_bucket(&self, bucket_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/storages/buckets/{bucket_id}")))
            .await
    }

    /// Update bucket preset or access policy.
    pub async fn update_bucket(
        &self,
        bucket_id: i64,
        preset_id: Option<i64>,
        is_public: Option<bool>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(preset_id) = preset_id {
            payload["preset_id"] = json!(preset_id);
        }
        if let Some(is_public) = is_public {
            payload["bucket_type"] = json!(if is_public { "public" } else { "private" });
        }
        self.patch(self.v1(&format!("/storages/buckets/{bucket_id}")), payload)
            .await
    }

    /// List storage users.
    pub async fn get_storage_users(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/storages/users")).await
    }

    /// Reset a storage user's secret key.
    pub async fn update_storage_user_secret(
        &self,
        user_id: i64,
        secret_key: &str,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/storages/users/{user_id}")),
            json!({ "secret_key": secret_key }),
        )
        .await
    }

    /// Get the file transfer status for a bucket.
    pub async fn get_storage_transfer_status(&self, bucket_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!(
            "/storages/buckets/{bucket_id}/transfer-status"
        )))
        .await
    }

    /// List bucket subdomains.
    pub async fn get_bucket_subdomains(&self, bucket_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/storages/buckets/{bucket_id}/subdomains")))
            .await
    }

    /// Attach subdomains to a bucket.
    pub async fn add_bucket_subdomains(
        &self,
        bucket_id: i64,
        subdomains: &[String],
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/storages/buckets/{bucket_id}/subdomains")),
            json!({ "subdomains": subdomains }),
        )
        .await
    }

    /// Detach subdomains from a bucket.
    pub async fn delete_bucket_subdomains(
        &self,
        bucket_id: i64,
        subdomains: &[String],
    ) -> Result<ApiResponse, Error> {
        self.delete_json(
            self.v1(&format!("/storages/buckets/{bucket_id}/subdomains")),
            json!({ "subdomains": subdomains }),
        )
        .await
    }

    /// Issue a TLS certificate for a bucket subdomain.
    pub async fn gen_cert_for_bucket_subdomain(
        &self,
        subdomain: &str,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1("/storages/certificates/generate"),
            json!({ "subdomain": subdomain }),
        )
        .await
    }

    // ========================================================================
    // Load Balancer Operations
    // ========================================================================

    /// List load balancers.
    pub async fn get_balancers(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/balancers")).await
    }

    /// Get one load balancer.
    pub async fn get_balancer(&self, balancer_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/balancers/{balancer_id}"))).await
    }

    /// Create a load balancer.
    pub async fn create_balancer(&self, spec: &CreateBalancer<'_>) -> Result<ApiResponse, Error> {
        self.post(self.v1("/balancers"), to_value(spec)?).await
    }

    /// Update a load balancer.
    pub async fn update_balancer(
        &self,
        balancer_id: i64,
        spec: &UpdateBalancer<'_>,
    ) -> Result<ApiResponse, Error> {
        self.patch(self.v1(&format!("/balancers/{balancer_id}")), to_value(spec)?)
            .await
    }

    /// Delete a load balancer.
    pub async fn delete_balancer(&self, balancer_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/balancers/{balancer_id}"))).await
    }

    /// List balancer presets.
    pub async fn get_balancer_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/balancers")).await
    }

    /// List backend IPs behind a balancer.
    pub async fn get_balancer_ips(&self, balancer_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/balancers/{balancer_id}/ips"))).await
    }

    /// Add backend IPs to a balancer.
    pub async fn add_ips_to_balancer(
        &self,
        balancer_id: i64,
        ips: &[String],
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/balancers/{balancer_id}/ips")),
            json!({ "ips": ips }),
        )
        .await
    }

    /// Remove backend IPs from a balancer.
    pub async fn delete_ips_from_balancer(
        &self,
        balancer_id: i64,
        ips: &[String],
    ) -> Result<ApiResponse, Error> {
        self.delete_json(
            self.v1(&format!("/balancers/{balancer_id}/ips")),
            json!({ "ips": ips }),
        )
        .await
    }

    /// List forwarding rules on a balancer.
    pub async fn get_balancer_rules(&self, balancer_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/balancers/{balancer_id}/rules"))).await
    }

    /// Create a forwarding rule.
    pub async fn create_balancer_rule(
        &self,
        balancer_id: i64,
        rule: &BalancerRule,
    ) -> Result<ApiResponse, Error> {
        self.post(self.v1(&format!("/balancers/{balancer_id}/rules")), to_value(rule)?)
            .await
    }

    /// Update a forwarding rule.
    pub async fn update_balancer_rule(
        &self,
        balancer_id: i64,
        rule_id: i64,
        rule: &BalancerRule,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/balancers/{balancer_id}/rules/{rule_id}")),
            to_value(rule)?,
        )
        .await
    }

    /// Delete a forwarding rule.
    pub async fn delete_balancer_rule(
        &self,
        balancer_id: i64,
        rule_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/balancers/{balancer_id}/rules/{rule_id}")))
            .await
    }

    // ========================================================================
    // Kubernetes Operations
    // ========================================================================

    /// List Kubernetes clusters.
    pub async fn get_clusters(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/k8s/clusters"), &paging(limit, offset))
            .await
    }

    /// Get one Kubernetes cluster.
    pub async fn get_cluster(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/k8s/clusters/{cluster_id}"))).await
    }

    /// Create a Kubernetes cluster.
    pub async fn create_cluster(&self, spec: &CreateCluster<'_>) -> Result<ApiResponse, Error> {
        self.post(self.v1("/k8s/clusters"), to_value(spec)?).await
    }

    /// Update a cluster description.
    pub async fn update_cluster(
        &self,
        cluster_id: i64,
        description: &str,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/k8s/clusters/{cluster_id}")),
            json!({ "description": description }),
        )
        .await
    }

    /// Delete a Kubernetes cluster.
    pub async fn delete_cluster(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/k8s/clusters/{cluster_id}"))).await
    }

    /// Get allocated/requested/capacity resources of a cluster.
    pub async fn get_cluster_resources(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/k8s/clusters/{cluster_id}/resources")))
            .await
    }

    /// Download the cluster kubeconfig (YAML body).
    pub async fn get_cluster_kubeconfig(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/k8s/clusters/{cluster_id}/kubeconfig")))
            .await
    }

    /// List node groups in a cluster.
    pub async fn get_node_groups(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/k8s/clusters/{cluster_id}/groups")))
            .await
    }

    /// Create a worker node group.
    pub async fn create_node_group(
        &self,
        cluster_id: i64,
        name: &str,
        preset_id: i64,
        node_count: u32,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/k8s/clusters/{cluster_id}/groups")),
            json!({ "name": name, "preset_id": preset_id, "node_count": node_count }),
        )
        .await
    }

    /// Delete a worker node group.
    pub async fn delete_node_group(
        &self,
        cluster_id: i64,
        group_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/k8s/clusters/{cluster_id}/groups/{group_id}")))
            .await
    }

    /// List worker nodes in a group.
    pub async fn get_nodes_in_group(
        &self,
        cluster_id: i64,
        group_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!(
            "/k8s/clusters/{cluster_id}/groups/{group_id}/nodes"
        )))
        .await
    }

    /// Scale a node group up by `count` nodes.
    pub async fn add_nodes_to_group(
        &self,
        cluster_id: i64,
        group_id: i64,
        count: u32,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!(
                "/k8s/clusters/{cluster_id}/groups/{group_id}/nodes"
            )),
            json!({ "count": count }),
        )
        .await
    }

    /// Scale a node group down by `count` nodes.
    pub async fn delete_nodes_from_group(
        &self,
        cluster_id: i64,
        group_id: i64,
        count: u32,
    ) -> Result<ApiResponse, Error> {
        self.delete_json(
            self.v1(&format!(
                "/k8s/clusters/{cluster_id}/groups/{group_id}/nodes"
            )),
            json!({ "count": count }),
        )
        .await
    }

    /// List all worker nodes in a cluster.
    pub async fn get_cluster_nodes(&self, cluster_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/k8s/clusters/{cluster_id}/nodes")))
            .await
    }

    /// Delete one worker node.
    pub async fn delete_cluster_node(
        &self,
        cluster_id: i64,
        node_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/k8s/clusters/{cluster_id}/nodes/{node_id}")))
            .await
    }

    /// List supported Kubernetes versions.
    pub async fn get_k8s_versions(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/k8s/k8s_versions")).await
    }

    /// List supported network drivers.
    pub async fn get_k8s_network_drivers(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/k8s/network_drivers")).await
    }

    /// List Kubernetes node presets.
    pub async fn get_k8s_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/k8s")).await
    }

    // ========================================================================
    // Domain Operations
    // ========================================================================

    /// List domains.
    pub async fn get_domains(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/domains"), &paging(limit, offset)).await
    }

    /// Get one domain.
    pub async fn get_domain(&self, fqdn: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/domains/{fqdn}"))).await
    }

    /// Add a domain to the account.
    pub async fn add_domain(&self, fqdn: &str) -> Result<ApiResponse, Error> {
        self.post(self.v1(&format!("/add-domain/{fqdn}")), json!({}))
            .await
    }

    /// Remove a domain from the account.
    pub async fn delete_domain(&self, fqdn: &str) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/domains/{fqdn}"))).await
    }

    /// Toggle domain auto-prolong.
    pub async fn set_domain_autoprolong(
        &self,
        fqdn: &str,
        enabled: bool,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/domains/{fqdn}")),
            json!({ "is_autoprolong_enabled": enabled }),
        )
        .await
    }

    /// List DNS records on a domain.
    pub async fn get_domain_dns_records(
        &self,
        fqdn: &str,
        limit: u32,
        offset: u32,
    ) -> Result<ApiResponse, Error> {
        self.get_query(
            self.v1(&format!("/domains/{fqdn}/dns-records")),
            &paging(limit, offset),
        )
        .await
    }

    /// Add a DNS record.
    pub async fn add_domain_dns_record(
        &self,
        fqdn: &str,
        record: &DnsRecord<'_>,
    ) -> Result<ApiResponse, Error> {
        self.post(self.v1(&format!("/domains/{fqdn}/dns-records")), to_value(record)?)
            .await
    }

    /// Replace a DNS record.
    pub async fn update_domain_dns_record(
        &self,
        fqdn: &str,
        record_id: i64,
        record: &DnsRecord<'_>,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/domains/{fqdn}/dns-records/{record_id}")),
            to_value(record)?,
        )
        .await
    }

    /// Delete a DNS record.
    pub async fn delete_domain_dns_record(
        &self,
        fqdn: &str,
        record_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/domains/{fqdn}/dns-records/{record_id}")))
            .await
    }

    /// Create a subdomain.
    pub async fn add_subdomain(
        &self,
        fqdn: &str,
        subdomain_fqdn: &str,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/domains/{fqdn}/subdomains/{subdomain_fqdn}")),
            json!({}),
        )
        .await
    }

    /// Delete a subdomain along with its DNS records.
    pub async fn delete_subdomain(
        &self,
        fqdn: &str,
        subdomain_fqdn: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/domains/{fqdn}/subdomains/{subdomain_fqdn}")))
            .await
    }

    // ========================================================================
    // VPC Operations
    // ========================================================================

    /// List VPCs.
    pub async fn get_vpcs(&self) -> Result<ApiResponse, Error> {
        self.get(self.v2("/vpcs")).await
    }

    /// Get one VPC.
    pub async fn get_vpc(&self, vpc_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v2(&format!("/vpcs/{vpc_id}"))).await
    }

    /// Create a VPC.
    pub async fn create_vpc(
        &self,
        name: &str,
        subnet_v4: &str,
        region: Region,
        description: Option<&str>,
        zone: Option<AvailabilityZone>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({
            "name": name,
            "subnet_v4": subnet_v4,
            "location": region,
        });
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        if let Some(zone) = zone {
            payload["availability_zone"] = json!(zone);
        }
        self.post(self.v2("/vpcs"), payload).await
    }

    /// Update VPC name or description.
    pub async fn update_vpc(
        &self,
        vpc_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(name) = name {
            payload["name"] = json!(name);
        }
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        self.patch(self.v2(&format!("/vpcs/{vpc_id}")), payload).await
    }

    /// Delete a VPC. Delete is only available on the v1 path.
    pub async fn delete_vpc(&self, vpc_id: &str) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/vpcs/{vpc_id}"))).await
    }

    /// List services attached to a VPC.
    pub async fn get_vpc_services(&self, vpc_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v2(&format!("/vpcs/{vpc_id}/services"))).await
    }

    /// List ports in a VPC.
    pub async fn get_vpc_ports(&self, vpc_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/vpcs/{vpc_id}/ports"))).await
    }

    // ========================================================================
    // Firewall Operations
    // ========================================================================

    /// List firewall groups.
    pub async fn get_firewall_groups(&self, limit: u32, offset: u32) -> Result<ApiResponse, Error> {
        self.get_query(self.v1("/firewall/groups"), &paging(limit, offset))
            .await
    }

    /// Get one firewall group.
    pub async fn get_firewall_group(&self, group_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/firewall/groups/{group_id}"))).await
    }

    /// Create a firewall group.
    pub async fn create_firewall_group(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({ "name": name });
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        self.post(self.v1("/firewall/groups"), payload).await
    }

    /// Update a firewall group.
    pub async fn update_firewall_group(
        &self,
        group_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(name) = name {
            payload["name"] = json!(name);
        }
        if let Some(description) = description {
            payload["description"] = json!(description);
        }
        self.patch(self.v1(&format!("/firewall/groups/{group_id}")), payload)
            .await
    }

    /// Delete a firewall group.
    pub async fn delete_firewall_group(&self, group_id: &str) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/firewall/groups/{group_id}")))
            .await
    }

    /// List resources linked to a firewall group.
    pub async fn get_firewall_group_resources(
        &self,
        group_id: &str,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/firewall/groups/{group_id}/resources")))
            .await
    }

    /// Link a resource to a firewall group.
    pub async fn link_resource_to_firewall(
        &self,
        group_id: &str,
        resource_id: i64,
        resource_type: ResourceType,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!(
                "/firewall/groups/{group_id}/resources/{resource_id}"
            )),
            json!({ "resource_type": resource_type }),
        )
        .await
    }

    /// Unlink a resource from a firewall group.
    pub async fn unlink_resource_from_firewall(
        &self,
        group_id: &str,
        resource_id: i64,
        resource_type: ResourceType,
    ) -> Result<ApiResponse, Error> {
        self.delete_json(
            self.v1(&format!(
                "/firewall/groups/{group_id}/resources/{resource_id}"
            )),
            json!({ "resource_type": resource_type }),
        )
        .await
    }

    /// List rules in a firewall group.
    pub async fn get_firewall_rules(
        &self,
        group_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<ApiResponse, Error> {
        self.get_query(
            self.v1(&format!("/firewall/groups/{group_id}/rules")),
            &paging(limit, offset),
        )
        .await
    }

    /// Get one firewall rule.
    pub async fn get_firewall_rule(
        &self,
        group_id: &str,
        rule_id: &str,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/firewall/groups/{group_id}/rules/{rule_id}")))
            .await
    }

    /// Create a firewall rule.
    pub async fn create_firewall_rule(
        &self,
        group_id: &str,
        rule: &FirewallRule<'_>,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/firewall/groups/{group_id}/rules")),
            to_value(rule)?,
        )
        .await
    }

    /// Replace a firewall rule.
    pub async fn update_firewall_rule(
        &self,
        group_id: &str,
        rule_id: &str,
        rule: &FirewallRule<'_>,
    ) -> Result<ApiResponse, Error> {
        self.patch(
            self.v1(&format!("/firewall/groups/{group_id}/rules/{rule_id}")),
            to_value(rule)?,
        )
        .await
    }

    /// Delete a firewall rule.
    pub async fn delete_firewall_rule(
        &self,
        group_id: &str,
        rule_id: &str,
    ) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/firewall/groups/{group_id}/rules/{rule_id}")))
            .await
    }

    /// List firewall groups a resource is linked to.
    pub async fn get_resource_firewall_groups(
        &self,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/firewall/service/{resource_type}/{resource_id}")))
            .await
    }

    // ========================================================================
    // Floating IP Operations
    // ========================================================================

    /// List floating IPs.
    pub async fn get_floating_ips(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/floating-ips")).await
    }

    /// Get one floating IP.
    pub async fn get_floating_ip(&self, floating_ip_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/floating-ips/{floating_ip_id}")))
            .await
    }

    /// Order a new floating IP in an availability zone.
    pub async fn create_floating_ip(
        &self,
        zone: AvailabilityZone,
        ddos_guard: bool,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1("/floating-ips"),
            json!({ "availability_zone": zone, "is_ddos_guard": ddos_guard }),
        )
        .await
    }

    /// Update floating IP comment or PTR.
    pub async fn update_floating_ip(
        &self,
        floating_ip_id: &str,
        comment: Option<&str>,
        ptr: Option<&str>,
    ) -> Result<ApiResponse, Error> {
        let mut payload = json!({});
        if let Some(comment) = comment {
            payload["comment"] = json!(comment);
        }
        if let Some(ptr) = ptr {
            payload["ptr"] = json!(ptr);
        }
        self.patch(self.v1(&format!("/floating-ips/{floating_ip_id}")), payload)
            .await
    }

    /// Release a floating IP.
    pub async fn delete_floating_ip(&self, floating_ip_id: &str) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/floating-ips/{floating_ip_id}")))
            .await
    }

    /// Bind a floating IP to a resource.
    pub async fn attach_floating_ip(
        &self,
        floating_ip_id: &str,
        resource_type: ResourceType,
        resource_id: i64,
    ) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/floating-ips/{floating_ip_id}/bind")),
            json!({ "resource_type": resource_type, "resource_id": resource_id }),
        )
        .await
    }

    /// Unbind a floating IP from whatever it is bound to.
    pub async fn detach_floating_ip(&self, floating_ip_id: &str) -> Result<ApiResponse, Error> {
        self.post(
            self.v1(&format!("/floating-ips/{floating_ip_id}/unbind")),
            json!({}),
        )
        .await
    }

    // ========================================================================
    // App Platform Operations
    // ========================================================================

    /// List apps.
    pub async fn get_apps(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/apps")).await
    }

    /// Get one app.
    pub async fn get_app(&self, app_id: i64) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/apps/{app_id}"))).await
    }

    /// Create an app from a deploy payload.
    pub async fn create_app(&self, payload: Value) -> Result<ApiResponse, Error> {
        self.post(self.v1("/apps"), payload).await
    }

    /// Delete an app.
    pub async fn delete_app(&self, app_id: i64) -> Result<ApiResponse, Error> {
        self.delete(self.v1(&format!("/apps/{app_id}"))).await
    }

    /// List connected VCS providers.
    pub async fn get_vcs_providers(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/vcs-provider")).await
    }

    /// List repositories for a VCS provider.
    pub async fn get_repositories(&self, vcs_provider_id: &str) -> Result<ApiResponse, Error> {
        self.get(self.v1(&format!("/vcs-provider/{vcs_provider_id}")))
            .await
    }

    /// List app platform presets.
    pub async fn get_apps_presets(&self) -> Result<ApiResponse, Error> {
        self.get(self.v1("/presets/apps")).await
    }
}

fn paging(limit: u32, offset: u32) -> [(&'static str, String); 2] {
    [("limit", limit.to_string()), ("offset", offset.to_string())]
}

fn to_value<T: Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value)
        .map_err(|e| Error::MalformedResponse(format!("cannot serialize payload: {e}")))
}

// ============================================================================
// Request Payloads
// ============================================================================

/// Payload for [`ApiClient::create_server`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateServer {
    /// Display name.
    pub name: String,
    /// Network bandwidth in Mbit/s.
    pub bandwidth: u32,
    /// Custom sizing; mutually exclusive with `preset_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ServerConfiguration>,
    /// Fixed preset; mutually exclusive with `configuration`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<i64>,
    /// Provider OS image; mutually exclusive with `image_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<i64>,
    /// Customer image; mutually exclusive with `os_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Pre-installed software bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_id: Option<i64>,
    /// SSH keys to install.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_keys_ids: Option<Vec<i64>>,
    /// Enable DDoS protection.
    pub is_ddos_guard: bool,
    /// Attach to a local network, e.g. `{"id": "vpc-..."}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Value>,
    /// Availability zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<AvailabilityZone>,
    /// Ask for a root password even when keys are installed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_root_password_required: Option<bool>,
    /// Project to place the server into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// cloud-init user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_init: Option<String>,
}

/// Payload for [`ApiClient::update_server`]. All fields optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateServer {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Network bandwidth in Mbit/s.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bandwidth: Option<u32>,
    /// Custom sizing. API quirk: the PATCH field is named `configurator`.
    #[serde(rename = "configurator", skip_serializing_if = "Option::is_none")]
    pub configuration: Option<ServerConfiguration>,
    /// Fixed preset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<i64>,
    /// Provider OS image (triggers reinstall).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_id: Option<i64>,
    /// Customer image (triggers reinstall).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Software bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub software_id: Option<i64>,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Auto-backup schedule for disks and databases.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AutoBackupSettings {
    /// Enable or disable the schedule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enabled: Option<bool>,
    /// Retained copies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy_count: Option<u32>,
    /// Day of month to start on (1-31).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_start_at: Option<u32>,
    /// Backup interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<BackupInterval>,
    /// Day of week (1-7) for weekly schedules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u32>,
}

/// Payload for [`ApiClient::create_image`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateImage<'a> {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
    /// Source disk to snapshot; omit to create an upload placeholder.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_id: Option<i64>,
    /// Pull the image from a URL instead of a disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_url: Option<&'a str>,
    /// Region to store the image in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Region>,
    /// OS family of the image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsType>,
}

/// Payload for [`ApiClient::create_database`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateDatabase<'a> {
    /// Display name.
    pub name: &'a str,
    /// Database engine.
    #[serde(rename = "type")]
    pub engine: DatabaseEngine,
    /// Preset to size against.
    pub preset_id: i64,
    /// Admin password.
    pub password: &'a str,
    /// Admin login; engine default when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<&'a str>,
    /// Engine tunables, e.g. `{"max_connections": 100}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_parameters: Option<Value>,
}

/// Payload for [`ApiClient::update_database`]. All fields optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDatabase<'a> {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    /// Admin password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<&'a str>,
    /// Preset to resize to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<i64>,
    /// Engine tunables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_parameters: Option<Value>,
    /// Expose on a public IP.
    #[serde(rename = "is_external_ip", skip_serializing_if = "Option::is_none")]
    pub external_ip: Option<bool>,
}

/// Payload for [`ApiClient::create_balancer`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateBalancer<'a> {
    /// Display name.
    pub name: &'a str,
    /// Preset to size against.
    pub preset_id: i64,
    /// Balancing algorithm.
    pub algo: BalancerAlgo,
    /// Frontend protocol.
    pub proto: BalancerProto,
    /// Health check port.
    pub port: u16,
    /// Health check path.
    pub path: &'a str,
    /// Health check interval in seconds.
    pub inter: u32,
    /// Health check timeout in seconds.
    pub timeout: u32,
    /// Checks failed before marking a backend down.
    pub fall: u32,
    /// Checks passed before marking a backend up.
    pub rise: u32,
    /// Sticky sessions.
    #[serde(rename = "is_sticky")]
    pub sticky: bool,
    /// Send PROXY protocol headers to backends.
    #[serde(rename = "is_use_proxy")]
    pub proxy_protocol: bool,
    /// Redirect HTTP to HTTPS.
    #[serde(rename = "is_ssl")]
    pub force_https: bool,
    /// Keep backend connections alive.
    #[serde(rename = "is_keepalive")]
    pub backend_keepalive: bool,
    /// Attach to a local network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<Value>,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<&'a str>,
    /// Project to place the balancer into.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    /// Connection cap. API name is `maxconn`.
    #[serde(rename = "maxconn", skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

/// Payload for [`ApiClient::update_balancer`]. All fields optional.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBalancer<'a> {
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    /// Preset to resize to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_id: Option<i64>,
    /// Balancing algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub algo: Option<BalancerAlgo>,
    /// Frontend protocol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proto: Option<BalancerProto>,
    /// Health check port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Health check path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
    /// Sticky sessions.
    #[serde(rename = "is_sticky", skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,
    /// Send PROXY protocol headers to backends.
    #[serde(rename = "is_use_proxy", skip_serializing_if = "Option::is_none")]
    pub proxy_protocol: Option<bool>,
    /// Redirect HTTP to HTTPS.
    #[serde(rename = "is_ssl", skip_serializing_if = "Option::is_none")]
    pub force_https: Option<bool>,
    /// Keep backend connections alive.
    #[serde(rename = "is_keepalive", skip_serializing_if = "Option::is_none")]
    pub backend_keepalive: Option<bool>,
}

/// One forwarding rule on a load balancer.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BalancerRule {
    /// Frontend port.
    pub balancer_port: u16,
    /// Frontend protocol.
    pub balancer_proto: BalancerProto,
    /// Backend port.
    pub server_port: u16,
    /// Backend protocol.
    pub server_proto: BalancerProto,
}

/// Payload for [`ApiClient::create_cluster`].
#[derive(Debug, Clone, Serialize)]
pub struct CreateCluster<'a> {
    /// Display name.
    pub name: &'a str,
    /// Description (empty string when unset; the API requires the field).
    pub description: &'a str,
    /// Master replicas toggle. Not functional server-side; always false.
    pub ha: bool,
    /// Kubernetes version, from `get_k8s_versions()`.
    pub k8s_version: &'a str,
    /// Network driver, from `get_k8s_network_drivers()`.
    pub network_driver: &'a str,
    /// Deploy an ingress controller.
    pub ingress: bool,
    /// Master node preset.
    pub preset_id: i64,
    /// Worker groups, e.g. `[{"name": "default", "preset_id": 399, "node_count": 1}]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub worker_groups: Option<Value>,
}

/// One DNS record on a domain.
#[derive(Debug, Clone, Serialize)]
pub struct DnsRecord<'a> {
    /// Record type. Serialized uppercase on the wire.
    #[serde(rename = "type", serialize_with = "uppercase_record_type")]
    pub record_type: DnsRecordType,
    /// Record value (address, target host, text).
    pub value: &'a str,
    /// Subdomain the record applies to; apex when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<&'a str>,
    /// Priority for MX/SRV records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
    /// Time to live in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

fn uppercase_record_type<S>(t: &DnsRecordType, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&t.as_str().to_ascii_uppercase())
}

/// One firewall rule.
#[derive(Debug, Clone, Serialize)]
pub struct FirewallRule<'a> {
    /// Traffic direction.
    pub direction: FirewallDirection,
    /// Protocol.
    pub protocol: FirewallProto,
    /// Port or port range (`"80"`, `"3000-4000"`); omitted for ICMP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<&'a str>,
    /// Source/destination network in CIDR notation.
    pub cidr: &'a str,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        ApiClient::new("test-token").expect("client")
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let c = ApiClient::with_base_url("t", "https://api.example.test/").expect("client");
        assert_eq!(c.base_url(), "https://api.example.test");
    }

    #[test]
    fn versioned_paths() {
        let c = client();
        assert_eq!(c.v1("/servers"), "https://api.stratus.cloud/api/v1/servers");
        assert_eq!(c.v2("/vpcs"), "https://api.stratus.cloud/api/v2/vpcs");
    }

    #[test]
    fn debug_does_not_leak_token() {
        let c = client();
        let repr = format!("{c:?}");
        assert!(!repr.contains("test-token"));
    }

    #[test]
    fn api_response_json_parsing() {
        let resp = ApiResponse {
            status: StatusCode::OK,
            body: r#"{"server": {"id": 42}}"#.into(),
        };
        let json = resp.json().expect("json");
        assert_eq!(json["server"]["id"], 42);

        let bad = ApiResponse {
            status: StatusCode::OK,
            body: "not json".into(),
        };
        assert!(bad.json().is_err());
    }

    #[test]
    fn create_server_payload_skips_unset_fields() {
        let spec = CreateServer {
            name: "web-1".into(),
            bandwidth: 200,
            preset_id: Some(10),
            os_id: Some(79),
            ..Default::default()
        };
        let value = to_value(&spec).expect("serialize");
        assert_eq!(value["name"], "web-1");
        assert_eq!(value["preset_id"], 10);
        assert_eq!(value["is_ddos_guard"], false);
        assert!(value.get("configuration").is_none());
        assert!(value.get("cloud_init").is_none());
    }

    #[tokio::test]
    async fn create_server_requires_sizing() {
        let spec = CreateServer {
            name: "web-1".into(),
            bandwidth: 200,
            os_id: Some(79),
            ..Default::default()
        };
        let err = client().create_server(&spec).await.unwrap_err();
        assert!(err.to_string().contains("configuration, preset_id"));
    }

    #[tokio::test]
    async fn create_server_requires_os_or_image() {
        let spec = CreateServer {
            name: "web-1".into(),
            bandwidth: 200,
            preset_id: Some(10),
            ..Default::default()
        };
        let err = client().create_server(&spec).await.unwrap_err();
        assert!(err.to_string().contains("os_id, image_id"));
    }

    #[tokio::test]
    async fn upload_image_fails_early_on_unreadable_file() {
        // The file is read before any request is sent.
        let err = client()
            .upload_image("img-1", Path::new("/nonexistent/disk.qcow2"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }

    #[test]
    fn update_server_renames_configurator_field() {
        let spec = UpdateServer {
            configuration: Some(ServerConfiguration {
                configurator_id: 11,
                disk: 10240,
                cpu: 1,
                ram: 2048,
            }),
            ..Default::default()
        };
        let value = to_value(&spec).expect("serialize");
        assert!(value.get("configurator").is_some());
        assert!(value.get("configuration").is_none());
    }

    #[test]
    fn balancer_payload_uses_wire_field_names() {
        let spec = CreateBalancer {
            name: "lb-1",
            preset_id: 1,
            algo: BalancerAlgo::RoundRobin,
            proto: BalancerProto::Http,
            port: 80,
            path: "/",
            inter: 10,
            timeout: 5,
            fall: 3,
            rise: 2,
            sticky: true,
            proxy_protocol: false,
            force_https: true,
            backend_keepalive: false,
            network: None,
            comment: None,
            project_id: None,
            max_connections: Some(1000),
        };
        let value = to_value(&spec).expect("serialize");
        assert_eq!(value["is_sticky"], true);
        assert_eq!(value["is_ssl"], true);
        assert_eq!(value["maxconn"], 1000);
        assert_eq!(value["algo"], "roundrobin");
    }

    #[test]
    fn dns_record_type_is_uppercased() {
        let record = DnsRecord {
            record_type: DnsRecordType::Cname,
            value: "target.example.com",
            subdomain: Some("www"),
            priority: None,
            ttl: Some(300),
        };
        let value = to_value(&record).expect("serialize");
        assert_eq!(value["type"], "CNAME");
        assert_eq!(value["subdomain"], "www");
        assert!(value.get("priority").is_none());
    }

    #[test]
    fn firewall_rule_omits_port_for_icmp() {
        let rule = FirewallRule {
            direction: FirewallDirection::Ingress,
            protocol: FirewallProto::Icmp,
            port: None,
            cidr: "0.0.0.0/0",
            description: None,
        };
        let value = to_value(&rule).expect("serialize");
        assert!(value.get("port").is_none());
        assert_eq!(value["protocol"], "icmp");
    }
}
