// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Where the shell keeps `config.json` and the key-value store.
//
// Resolution order: `SHORTAPP_DATA_DIR`, `$XDG_DATA_HOME/shortapp`,
// `$HOME/.local/share/shortapp`, then the system temp dir. Mobile hosts pass
// their documents directory with `--data-dir` instead.

use std::path::PathBuf;

use tracing::debug;

use shortapp_core::error::Result;

const APP_DIR: &str = "shortapp";

/// Environment inputs for [`resolve`], read once so resolution stays pure.
#[derive(Debug, Default)]
pub struct DataDirEnv {
    pub explicit: Option<PathBuf>,
    pub xdg_data_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl DataDirEnv {
    pub fn from_process() -> Self {
        let var = |name: &str| {
            std::env::var_os(name)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self {
            explicit: var("SHORTAPP_DATA_DIR"),
            xdg_data_home: var("XDG_DATA_HOME"),
            home: var("HOME"),
        }
    }
}

/// Pick the data directory for `env` without touching the filesystem.
pub fn resolve(env: &DataDirEnv) -> PathBuf {
    if let Some(dir) = &env.explicit {
        return dir.clone();
    }
    let base = match (&env.xdg_data_home, &env.home) {
        (Some(xdg), _) => xdg.clone(),
        (None, Some(home)) => home.join(".local").join("share"),
        (None, None) => std::env::temp_dir(),
    };
    base.join(APP_DIR)
}

/// Resolve the data directory for this process and make sure it exists.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve(&DataDirEnv::from_process());
    std::fs::create_dir_all(&dir)?;
    debug!(path = %dir.display(), "data directory ready");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_dir_wins_as_is() {
        let env = DataDirEnv {
            explicit: Some("/srv/shortapp-data".into()),
            xdg_data_home: Some("/xdg".into()),
            home: Some("/home/dev".into()),
        };
        assert_eq!(resolve(&env), PathBuf::from("/srv/shortapp-data"));
    }

    #[test]
    fn xdg_then_home() {
        let mut env = DataDirEnv {
            explicit: None,
            xdg_data_home: Some("/xdg".into()),
            home: Some("/home/dev".into()),
        };
        assert_eq!(resolve(&env), PathBuf::from("/xdg/shortapp"));

        env.xdg_data_home = None;
        assert_eq!(resolve(&env), PathBuf::from("/home/dev/.local/share/shortapp"));
    }

    #[test]
    fn nothing_set_falls_back_to_temp() {
        let dir = resolve(&DataDirEnv::default());
        assert!(dir.starts_with(std::env::temp_dir()));
        assert!(dir.ends_with(APP_DIR));
    }
}
