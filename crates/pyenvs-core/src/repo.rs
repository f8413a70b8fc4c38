/// A registry namespace used to qualify local tags for push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repo {
    base: String,
}

impl Repo {
    /// # Errors
    ///
    /// [`crate::Error::InvalidRepoBase`] if `base` ends with `/`.
    pub fn new(base: impl Into<String>) -> crate::Result<Self> {
        let base = base.into();
        if base.ends_with('/') {
            return Err(crate::Error::InvalidRepoBase { base });
        }
        Ok(Self { base })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Qualify each local tag with this repo, keeping order.
    pub fn tags<S: AsRef<str>>(&self, local_tags: &[S]) -> Vec<String> {
        local_tags
            .iter()
            .map(|tag| format!("{}/{}", self.base, tag.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_trailing_slash() {
        let err = Repo::new("ghcr.io/ffy00/").unwrap_err();
        assert!(err.to_string().contains("ghcr.io/ffy00/"), "got: {err}");
    }

    #[test]
    fn qualifies_tags() {
        let repo = Repo::new("ghcr.io/ffy00").unwrap();
        assert_eq!(
            repo.tags(&["debian:12", "debian:12-pc0.3.0"]),
            ["ghcr.io/ffy00/debian:12", "ghcr.io/ffy00/debian:12-pc0.3.0"]
        );
    }

    #[test]
    fn no_tags_yields_no_tags() {
        let repo = Repo::new("docker.io/ffy00").unwrap();
        assert!(repo.tags::<&str>(&[]).is_empty());
    }

    // ── Property-based tests ──

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn tag() -> impl Strategy<Value = String> {
            "[a-z][a-z0-9.-]{0,12}:[a-z0-9.-]{1,12}"
        }

        proptest! {
            #[test]
            fn tags_are_prefixed_in_order(
                base in "[a-z][a-z0-9./-]{0,20}[a-z0-9]",
                tags in proptest::collection::vec(tag(), 0..8),
            ) {
                let repo = Repo::new(base.clone()).unwrap();
                let qualified = repo.tags(&tags);
                let expected: Vec<String> =
                    tags.iter().map(|t| format!("{base}/{t}")).collect();
                prop_assert_eq!(qualified, expected);
            }

            #[test]
            fn duplicates_are_preserved(t in tag(), n in 1usize..5) {
                let repo = Repo::new("quay.io/ffy00").unwrap();
                let tags = vec![t; n];
                prop_assert_eq!(repo.tags(&tags).len(), n);
            }

            #[test]
            fn validation_depends_only_on_trailing_slash(base in "[a-z/.:]{0,24}") {
                let result = Repo::new(base.clone());
                prop_assert_eq!(result.is_err(), base.ends_with('/'));
            }
        }
    }
}
