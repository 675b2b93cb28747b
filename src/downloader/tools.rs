use serde::{Deserialize, Serialize};
use std::process::Command;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    /// `python -m yt_dlp`
    YtDlpModule,
    /// Needed by yt-dlp for MP3 conversion and chapter splitting
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::YtDlpModule => "yt_dlp (python)",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub tool_type: ToolType,
    pub version: Option<String>,
    pub path: Option<String>,
    pub is_available: bool,
}

/// How to start yt-dlp: native binary or the Python module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Launcher {
    Binary(String),
    PythonModule(String),
}

impl Launcher {
    pub fn program(&self) -> &str {
        match self {
            Launcher::Binary(path) => path,
            Launcher::PythonModule(python) => python,
        }
    }

    /// Full argument list, including `-m yt_dlp` for the Python launcher.
    pub fn args(&self, rest: Vec<String>) -> Vec<String> {
        match self {
            Launcher::Binary(_) => rest,
            Launcher::PythonModule(_) => {
                let mut args = vec!["-m".to_string(), "yt_dlp".to_string()];
                args.extend(rest);
                args
            }
        }
    }

    pub fn is_available(&self) -> bool {
        let probe = match self {
            Launcher::Binary(path) => Command::new(path).arg("--version").output(),
            Launcher::PythonModule(python) => Command::new(python).args(["-c", "import yt_dlp"]).output(),
        };
        matches!(probe, Ok(out) if out.status.success())
    }

    pub fn describe(&self) -> String {
        match self {
            Launcher::Binary(path) => path.clone(),
            Launcher::PythonModule(python) => format!("{} -m yt_dlp", python),
        }
    }
}

/// Find yt-dlp executable in common paths
pub fn find_ytdlp() -> String {
    find_binary("yt-dlp").unwrap_or_else(|| "yt-dlp".to_string())
}

/// First working Python interpreter among the common names.
pub fn find_python() -> String {
    let candidates = ["python3", "/opt/homebrew/bin/python3", "/usr/local/bin/python3", "python"];
    for cmd in candidates {
        if let Ok(output) = Command::new(cmd).arg("--version").output() {
            if output.status.success() {
                return cmd.to_string();
            }
        }
    }

    "python3".to_string()
}

fn find_binary(binary_name: &str) -> Option<String> {
    let common_paths = [
        format!("/opt/homebrew/bin/{}", binary_name), // Homebrew on Apple Silicon
        format!("/usr/local/bin/{}", binary_name),    // Homebrew on Intel Mac
        format!("/usr/bin/{}", binary_name),
    ];

    for path in common_paths {
        if std::path::Path::new(&path).exists() {
            return Some(path);
        }
    }

    let which = if cfg!(windows) { "where" } else { "which" };
    if let Ok(output) = Command::new(which).arg(binary_name).output() {
        if output.status.success() {
            let path = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or_default()
                .trim()
                .to_string();
            if !path.is_empty() {
                return Some(path);
            }
        }
    }

    None
}

/// Availability and versions of the configured tools
pub struct ToolManager {
    ytdlp_path: String,
    python_cmd: String,
}

impl ToolManager {
    pub fn new(ytdlp_path: impl Into<String>, python_cmd: impl Into<String>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
            python_cmd: python_cmd.into(),
        }
    }

    pub fn get_tool_info(&self, tool_type: ToolType) -> ToolInfo {
        let (path, version) = match tool_type {
            ToolType::YtDlp => match get_version(&self.ytdlp_path, &["--version"]) {
                Some(version) => (Some(self.ytdlp_path.clone()), Some(version)),
                None => (None, None),
            },
            ToolType::Ffmpeg => match find_binary("ffmpeg") {
                Some(path) => {
                    let version = get_version(&path, &["-version"])
                        .and_then(|v| v.lines().next().map(str::to_string));
                    (Some(path), version)
                }
                None => (None, None),
            },
            ToolType::YtDlpModule => {
                let launcher = Launcher::PythonModule(self.python_cmd.clone());
                if launcher.is_available() {
                    let version = get_version(&self.python_cmd, &["-m", "yt_dlp", "--version"]);
                    (Some(launcher.describe()), version)
                } else {
                    (None, None)
                }
            }
        };

        ToolInfo {
            name: tool_type.as_str().to_string(),
            tool_type,
            version,
            is_available: path.is_some(),
            path,
        }
    }

    pub fn get_all_tools(&self) -> Vec<ToolInfo> {
        vec![
            self.get_tool_info(ToolType::YtDlp),
            self.get_tool_info(ToolType::YtDlpModule),
            self.get_tool_info(ToolType::Ffmpeg),
        ]
    }
}

fn get_version(program: &str, args: &[&str]) -> Option<String> {
    match Command::new(program).args(args).output() {
        Ok(output) if output.status.success() => {
            Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn python_launcher_prefixes_module() {
        let launcher = Launcher::PythonModule("python3".to_string());
        assert_eq!(
            launcher.args(vec!["-J".to_string()]),
            vec!["-m", "yt_dlp", "-J"]
        );
        assert_eq!(launcher.describe(), "python3 -m yt_dlp");
    }

    #[test]
    fn binary_launcher_passes_args_through() {
        let launcher = Launcher::Binary("/usr/bin/yt-dlp".to_string());
        assert_eq!(launcher.program(), "/usr/bin/yt-dlp");
        assert_eq!(launcher.args(vec!["-J".to_string()]), vec!["-J"]);
    }

    #[test]
    fn missing_binary_is_not_available() {
        let launcher = Launcher::Binary("/definitely/not/here/yt-dlp".to_string());
        assert!(!launcher.is_available());
    }

    #[test]
    fn find_python_does_not_read_environment() {
        std::env::set_var("YTDLP_PYTHON", "/definitely/not/here/python-from-env");
        let found = find_python();
        std::env::remove_var("YTDLP_PYTHON");
        assert_ne!(found, "/definitely/not/here/python-from-env");
    }

    #[test]
    fn tools_panel_uses_configured_ytdlp_path() {
        let info = ToolManager::new("/definitely/not/here/yt-dlp", "python3").get_tool_info(ToolType::YtDlp);
        assert_eq!(info.name, "yt-dlp");
        assert!(!info.is_available);
        assert!(info.path.is_none());
    }
}
