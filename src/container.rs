use crate::config::ContainerConfig;
use crate::domain::Version;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Generate the out-of-band container refresh script.
///
/// The deployed container keeps reporting the old version until its baked-in
/// manifest is rewritten; this script performs that rewrite and restarts the
/// container. It is a side artifact for a manual post-deployment step, not
/// executed by this tool.
pub fn write_refresh_script(
    root: &Path,
    container: &ContainerConfig,
    previous: &Version,
    new: &Version,
) -> Result<PathBuf> {
    let script = render_script(&container.name, previous, new);

    let path = root.join(&container.refresh_script);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    }

    Ok(path)
}

fn render_script(container_name: &str, previous: &Version, new: &Version) -> String {
    format!(
        r#"#!/bin/bash
# Update version in running container to fix update notifications

CONTAINER_NAME="{container_name}"
OLD_VERSION="{previous}"
NEW_VERSION="{new}"

echo "Updating container version from $OLD_VERSION to $NEW_VERSION..."

# Check if container is running
if ! docker ps | grep -q $CONTAINER_NAME; then
  echo "Container $CONTAINER_NAME is not running"
  exit 1
fi

# Update package.json in container
echo "Updating package.json in container..."
docker exec $CONTAINER_NAME sed -i "s/\"version\": \"$OLD_VERSION\"/\"version\": \"$NEW_VERSION\"/g" /app/package.json

# Update compiled JavaScript files
echo "Updating compiled JavaScript files..."
docker exec $CONTAINER_NAME find /app -type f -name "*.js" -not -path "*/node_modules/*" -exec sed -i "s/$OLD_VERSION/$NEW_VERSION/g" {{}} \;

# Update compiled CJS files
echo "Updating compiled CJS files..."
docker exec $CONTAINER_NAME find /app -type f -name "*.cjs" -not -path "*/node_modules/*" -exec sed -i "s/$OLD_VERSION/$NEW_VERSION/g" {{}} \;

# Restart container to apply changes
echo "Restarting container to apply changes..."
docker restart $CONTAINER_NAME

echo "Container version updated"
"#,
        container_name = container_name,
        previous = previous,
        new = new,
    )
}
