//! Command-line assembly for the platform shell.

use crate::shell::Platform;

/// Quote `text` for the platform shell when it contains whitespace.
///
/// POSIX shells get backslash-escaped inner quotes; `cmd` gets doubled ones.
/// Text without whitespace is returned unchanged.
pub fn quote_executable(text: &str, platform: Platform) -> String {
    if !text.chars().any(char::is_whitespace) {
        return text.to_string();
    }
    match platform {
        Platform::Posix => format!("\"{}\"", text.replace('"', "\\\"")),
        Platform::Windows => format!("\"{}\"", text.replace('"', "\"\"")),
    }
}

/// Quote a single argument so the platform shell passes it through
/// literally.
///
/// On POSIX any character outside a conservative safe set puts the whole
/// argument in single quotes, so `$`, backticks and backslashes are not
/// expanded. `cmd` gets the same treatment as executables.
pub fn quote_argument(text: &str, platform: Platform) -> String {
    match platform {
        Platform::Posix => {
            let safe = |c: char| c.is_ascii_alphanumeric() || "_-.,/:=@%+".contains(c);
            if text.chars().all(safe) {
                text.to_string()
            } else {
                format!("'{}'", text.replace('\'', r"'\''"))
            }
        }
        Platform::Windows => quote_executable(text, platform),
    }
}

/// Join an executable and its arguments into one shell line, prefixed by
/// the execution wrapper when one is configured.
pub fn build_command_line(
    executable: &str,
    args: &[String],
    wrapper: Option<&str>,
    platform: Platform,
) -> String {
    let base = std::iter::once(quote_executable(executable, platform))
        .chain(
            args.iter()
                .filter(|arg| !arg.is_empty())
                .map(|arg| quote_argument(arg, platform)),
        )
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    match wrapper {
        Some(wrapper) => format!("{} {}", wrapper, base),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_paths_are_untouched() {
        assert_eq!(
            quote_executable("/proj/.venv/bin/fluxloop", Platform::Posix),
            "/proj/.venv/bin/fluxloop"
        );
        assert_eq!(
            quote_executable(r"C:\tools\fluxloop.exe", Platform::Windows),
            r"C:\tools\fluxloop.exe"
        );
    }

    #[test]
    fn posix_quotes_spaces_and_escapes_quotes() {
        assert_eq!(
            quote_executable("/Users/me/My Projects/bin/fluxloop", Platform::Posix),
            "\"/Users/me/My Projects/bin/fluxloop\""
        );
        assert_eq!(
            quote_executable("/odd \"dir\"/fluxloop", Platform::Posix),
            "\"/odd \\\"dir\\\"/fluxloop\""
        );
    }

    #[test]
    fn windows_doubles_quotes() {
        assert_eq!(
            quote_executable(r"C:\Program Files\Flux\fluxloop.exe", Platform::Windows),
            r#""C:\Program Files\Flux\fluxloop.exe""#
        );
        assert_eq!(
            quote_executable(r#"C:\a "b"\python.exe"#, Platform::Windows),
            r#""C:\a ""b""\python.exe""#
        );
    }

    #[test]
    fn quotes_without_whitespace_are_left_alone() {
        assert_eq!(quote_executable("say\"hi\"", Platform::Posix), "say\"hi\"");
    }

    #[test]
    fn command_line_quotes_arguments_with_spaces() {
        let args = vec![
            "run".to_string(),
            "experiment".to_string(),
            "--name".to_string(),
            "my run".to_string(),
        ];
        assert_eq!(
            build_command_line("/opt/my tools/fluxloop", &args, None, Platform::Posix),
            "\"/opt/my tools/fluxloop\" run experiment --name 'my run'"
        );
    }

    #[test]
    fn posix_arguments_are_not_expanded_by_the_shell() {
        assert_eq!(quote_argument("--limit=10", Platform::Posix), "--limit=10");
        assert_eq!(
            quote_argument("cost $HOME `id` a\\b", Platform::Posix),
            r"'cost $HOME `id` a\b'"
        );
        assert_eq!(quote_argument("it's", Platform::Posix), r"'it'\''s'");
    }

    #[cfg(unix)]
    #[test]
    fn quoted_arguments_round_trip_through_sh() {
        let arg = "price $5 `whoami` it's a\\b";
        let args = vec!["%s".to_string(), arg.to_string()];
        let line = build_command_line("printf", &args, None, Platform::Posix);
        let output = std::process::Command::new("sh")
            .arg("-c")
            .arg(&line)
            .output()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), arg);
    }

    #[test]
    fn windows_arguments_use_double_quotes() {
        assert_eq!(quote_argument("my run", Platform::Windows), "\"my run\"");
        assert_eq!(quote_argument("--json", Platform::Windows), "--json");
    }

    #[test]
    fn wrapper_is_prefixed_verbatim() {
        let args = vec!["status".to_string()];
        assert_eq!(
            build_command_line(
                "fluxloop",
                &args,
                Some("docker compose exec -T app"),
                Platform::Posix
            ),
            "docker compose exec -T app fluxloop status"
        );
    }

    #[test]
    fn empty_arguments_are_dropped() {
        let args = vec![String::new(), "--version".to_string()];
        assert_eq!(
            build_command_line("fluxloop", &args, None, Platform::Posix),
            "fluxloop --version"
        );
    }
}
