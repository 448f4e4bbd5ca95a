use std::path::Path;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tokio::fs;

use crate::{
    error::{Result, VidquizError},
    types::VideoDescriptor,
};

/// Load the input array of video objects.
pub async fn load_descriptors(path: &Path) -> Result<Vec<VideoDescriptor>> {
    let json_content =
        fs::read_to_string(path)
            .await
            .map_err(|source| VidquizError::InputUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

    serde_json::from_str(&json_content).map_err(|source| VidquizError::InputInvalid {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the annotated descriptors as JSON indented by four spaces.
pub async fn save_descriptors(descriptors: &[VideoDescriptor], path: &Path) -> Result<()> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    descriptors.serialize(&mut serializer)?;
    buf.push(b'\n');

    fs::write(path, &buf).await?;
    Ok(())
}
