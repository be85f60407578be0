//! A throwaway MySQL server for the storage integration tests.

use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt, TestcontainersError};

const IMAGE: &str = "mysql";
const TAG: &str = "8.4";
const PORT: u16 = 3306;
const DATABASE: &str = "tinylink";
const USER: &str = "tinylink";
const PASSWORD: &str = "tinylink";

/// A MySQL container with an empty `tinylink` database, owned by the
/// `tinylink` user. The container is removed when this value is dropped.
///
/// MySQL logs "ready for connections" once for its bootstrap server before
/// the real one starts, so callers should retry their first connection.
pub struct MySqlServer {
    container: ContainerAsync<GenericImage>,
}

impl MySqlServer {
    pub async fn start() -> Result<Self, TestcontainersError> {
        let container = GenericImage::new(IMAGE, TAG)
            .with_exposed_port(PORT.tcp())
            .with_wait_for(WaitFor::message_on_stderr("ready for connections"))
            .with_env_var("MYSQL_DATABASE", DATABASE)
            .with_env_var("MYSQL_USER", USER)
            .with_env_var("MYSQL_PASSWORD", PASSWORD)
            .with_env_var("MYSQL_ROOT_PASSWORD", "root")
            .start()
            .await?;

        Ok(Self { container })
    }

    /// DSN for the application user on the host-mapped port.
    pub async fn database_url(&self) -> Result<String, TestcontainersError> {
        let host = self.container.get_host().await?;
        let port = self.container.get_host_port_ipv4(PORT).await?;
        Ok(format!("mysql://{USER}:{PASSWORD}@{host}:{port}/{DATABASE}"))
    }
}
