// SSH 客户端 Handler 实现
// 实现 russh::client::Handler trait

use russh::keys::PublicKey;
use std::future::Future;
use tracing::{debug, info};

/// SSH 客户端 Handler
pub struct SshClientHandler {
    /// 设备主机名（用于日志）
    host: String,
}

impl SshClientHandler {
    pub fn new(host: String) -> Self {
        Self { host }
    }
}

impl russh::client::Handler for SshClientHandler {
    type Error = russh::Error;

    /// 检查设备公钥
    fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send {
        let fingerprint = server_public_key.fingerprint(russh::keys::ssh_key::HashAlg::Sha256);

        info!("[SSH] {} key fingerprint: {}", self.host, fingerprint);
        debug!("[SSH] {} key type: {}", self.host, server_public_key.algorithm());

        // TODO: 对照 known_hosts 校验设备指纹，目前接受所有公钥
        async { Ok(true) }
    }
}
