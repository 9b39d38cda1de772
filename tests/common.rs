#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::fs;
use std::path::Path;

pub fn gw() -> Command {
    let mut cmd = cargo_bin_cmd!("gliderwatch");
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

/// Write a config file pointing every remote at a closed local port
pub fn offline_config(dir: &Path) -> String {
    let path = dir.join("gliderwatch.conf");
    fs::write(
        &path,
        "erddap_server: http://127.0.0.1:9/erddap\n\
         glider_api: http://127.0.0.1:9/api\n\
         http_timeout_secs: 2\n",
    )
    .expect("write config");
    path.to_string_lossy().to_string()
}

/// Lay out `deployments/<year>/<deployment>/data/in/binary` under `root`
pub fn deployment_binary_dir(root: &Path, year: &str, deployment: &str) -> std::path::PathBuf {
    let dir = root
        .join("deployments")
        .join(year)
        .join(deployment)
        .join("data/in/binary");
    fs::create_dir_all(&dir).expect("create binary dir");
    dir
}
