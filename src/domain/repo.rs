use crate::error::{AppError, AppResult};

/// An `owner/name` pair identifying a hosted repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse a repository reference from a URL or shorthand.
    ///
    /// Accepts `https://github.com/owner/name`, with or without a trailing
    /// slash or `.git` suffix, as well as the bare `owner/name` form.
    pub fn parse(url: &str) -> AppResult<Self> {
        let trimmed = url.trim().trim_end_matches('/');
        let mut parts = trimmed.rsplit('/');

        let name = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| invalid(url))?;
        let owner = parts
            .next()
            .filter(|part| !part.is_empty())
            .ok_or_else(|| invalid(url))?;

        let name = name.strip_suffix(".git").unwrap_or(name);
        if name.is_empty() {
            return Err(invalid(url));
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

fn invalid(url: &str) -> AppError {
    AppError::Configuration(format!("invalid repository URL: '{url}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_url() {
        let repo = RepoRef::parse("https://github.com/rust-lang/cargo").unwrap();
        assert_eq!(repo.owner, "rust-lang");
        assert_eq!(repo.name, "cargo");
    }

    #[test]
    fn parses_with_trailing_slash_and_git_suffix() {
        let repo = RepoRef::parse("https://github.com/rust-lang/cargo.git/").unwrap();
        assert_eq!(repo.slug(), "rust-lang/cargo");
    }

    #[test]
    fn parses_shorthand() {
        let repo = RepoRef::parse("rust-lang/cargo").unwrap();
        assert_eq!(repo.slug(), "rust-lang/cargo");
    }

    #[test]
    fn rejects_bare_name() {
        assert!(RepoRef::parse("cargo").is_err());
        assert!(RepoRef::parse("").is_err());
        assert!(RepoRef::parse("/").is_err());
    }
}
