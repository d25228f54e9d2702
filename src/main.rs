// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Abacus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Abacus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Abacus CLI entrypoint.
//!
//! Runs the stand-alone HTTP upload service at `http://127.0.0.1:<port>`.
//! The port defaults to 3001 and can be set via `--port` or the `UPLOAD_PORT`
//! environment variable; uploaded files land under `<data-dir>/assets/uploads/`.

use std::error::Error;
use std::sync::Arc;

use abacus::server;
use abacus::store::WriteDurability;
use abacus::uploads::UploadFolder;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<data-dir>] [--port <port>] [--durable-writes]\n  {program} [--data-dir <dir>] [--port <port>] [--durable-writes]\n\nServes the image upload endpoint at `http://127.0.0.1:<port>` (POST /upload,\nPOST /delete, GET /assets/...). --port selects the port; when omitted, the\n`{env}` environment variable is consulted, then the default {default}.\n\nIf data-dir/--data-dir is omitted, the current working directory is used.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).",
        env = server::PORT_ENV_VAR,
        default = server::DEFAULT_PORT,
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    data_dir: Option<String>,
    port: Option<u16>,
    durable_writes: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                if options.data_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.data_dir = Some(dir);
            }
            "--port" => {
                if options.port.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                let port: u16 = raw.parse().map_err(|_| ())?;
                options.port = Some(port);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.data_dir.is_some() {
                    return Err(());
                }
                options.data_dir = Some(arg);
            }
        }
    }

    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        tracing_subscriber::fmt().init();

        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "abacus".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        let dir = options.data_dir.unwrap_or_else(|| ".".to_owned());
        let durability = if options.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        let folder = Arc::new(UploadFolder::new(dir).with_durability(durability));
        let port = options.port.unwrap_or_else(server::port_from_env);

        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
            let local_addr = listener.local_addr()?;
            tracing::info!("upload server listening on {local_addr}");
            server::serve(listener, folder).await?;
            Ok::<(), Box<dyn Error>>(())
        })?;

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("abacus: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};

    #[test]
    fn parses_empty_args() {
        let options = parse_options(std::iter::empty()).expect("parse options");
        assert_eq!(options, CliOptions::default());
    }

    #[test]
    fn parses_data_dir_flag() {
        let options = parse_options(["--data-dir".to_owned(), "some/dir".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.data_dir.as_deref(), Some("some/dir"));
        assert_eq!(options.port, None);
        assert!(!options.durable_writes);
    }

    #[test]
    fn parses_positional_data_dir() {
        let options = parse_options(["some/dir".to_owned()].into_iter()).expect("parse options");
        assert_eq!(options.data_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn parses_port() {
        let options = parse_options(["--port".to_owned(), "1234".to_owned()].into_iter())
            .expect("parse options");
        assert_eq!(options.port, Some(1234));
    }

    #[test]
    fn parses_durable_writes_with_data_dir_in_any_order() {
        let options = parse_options(
            ["--durable-writes".to_owned(), "some/dir".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert!(options.durable_writes);
        assert_eq!(options.data_dir.as_deref(), Some("some/dir"));

        let options = parse_options(
            ["some/dir".to_owned(), "--durable-writes".to_owned()].into_iter(),
        )
        .expect("parse options");
        assert!(options.durable_writes);
        assert_eq!(options.data_dir.as_deref(), Some("some/dir"));
    }

    #[test]
    fn rejects_invalid_port_values() {
        parse_options(["--port".to_owned(), "not-a-port".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned(), "99999".to_owned()].into_iter()).unwrap_err();
        parse_options(["--port".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_unknown_args() {
        parse_options(["--nope".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_duplicate_flags() {
        parse_options(["--durable-writes".to_owned(), "--durable-writes".to_owned()].into_iter())
            .unwrap_err();

        parse_options(
            ["--port".to_owned(), "1".to_owned(), "--port".to_owned(), "2".to_owned()].into_iter(),
        )
        .unwrap_err();

        parse_options(
            [
                "--data-dir".to_owned(),
                ".".to_owned(),
                "--data-dir".to_owned(),
                "other".to_owned(),
            ]
            .into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_multiple_positional_data_dirs() {
        parse_options(["one".to_owned(), "two".to_owned()].into_iter()).unwrap_err();
    }

    #[test]
    fn rejects_positional_data_dir_with_data_dir_flag() {
        parse_options(
            ["--data-dir".to_owned(), "one".to_owned(), "two".to_owned()].into_iter(),
        )
        .unwrap_err();
    }

    #[test]
    fn rejects_missing_data_dir_value() {
        parse_options(["--data-dir".to_owned()].into_iter()).unwrap_err();
    }
}
