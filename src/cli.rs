// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use crate::sync::{parse_ecc_flag, PushRequest};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "certsync",
    about = "Sync TLS certificates between a Vault KV store and local hosts",
    version
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download changed certificates for every tracked domain
    Fetch {
        /// Keep running, checking again every CHECK_INTERVAL seconds
        #[arg(long)]
        watch: bool,
    },

    /// Upload a locally issued certificate
    Push(PushArgs),
}

#[derive(Args, Debug)]
pub struct PushArgs {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
    pub domain: String,
    /// true, yes, 1, --ecc or -ecc for an ECC certificate
    #[arg(allow_hyphen_values = true)]
    pub is_ecc: String,
    /// CA chain, uploaded empty when omitted
    pub ca_file: Option<PathBuf>,
}

impl PushArgs {
    pub fn to_request(&self) -> PushRequest {
        PushRequest {
            cert_file: self.cert_file.clone(),
            key_file: self.key_file.clone(),
            domain: self.domain.clone(),
            is_ecc: parse_ecc_flag(&self.is_ecc),
            ca_file: self.ca_file.clone(),
        }
    }
}
