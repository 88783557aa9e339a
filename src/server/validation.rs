use crate::server::response::ApiError;

const MAX_REPO_NAME_LEN: usize = 100;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_repo_name(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Repository name is required."));
    }
    if name.len() > MAX_REPO_NAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Repository name cannot exceed {MAX_REPO_NAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(ApiError::bad_request(
            "Repository name can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    if name == "." || name == ".." {
        return Err(ApiError::bad_request("Repository name is reserved"));
    }
    Ok(())
}

/// Upload names become repository paths, so they must stay relative and
/// must not climb out of the repository root.
pub fn validate_upload_path(path: &str) -> Result<(), ApiError> {
    if path.is_empty() {
        return Err(ApiError::bad_request("Uploaded file is missing a filename"));
    }
    if path.starts_with('/') || path.contains('\\') {
        return Err(ApiError::bad_request(format!("Invalid file path: {path}")));
    }
    if path
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(ApiError::bad_request(format!("Invalid file path: {path}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_rules() {
        assert!(validate_repo_name("demo").is_ok());
        assert!(validate_repo_name("my.repo_v-2").is_ok());
        assert!(validate_repo_name("").is_err());
        assert!(validate_repo_name("has space").is_err());
        assert!(validate_repo_name("..").is_err());
        assert!(validate_repo_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_empty_repo_name_message() {
        let err = validate_repo_name("").unwrap_err();
        assert_eq!(err.message, "Repository name is required.");
    }

    #[test]
    fn test_upload_path_rules() {
        assert!(validate_upload_path("a.txt").is_ok());
        assert!(validate_upload_path("docs/guide.md").is_ok());
        assert!(validate_upload_path("").is_err());
        assert!(validate_upload_path("/etc/passwd").is_err());
        assert!(validate_upload_path("../escape").is_err());
        assert!(validate_upload_path("docs//x").is_err());
        assert!(validate_upload_path("win\\path").is_err());
    }
}
