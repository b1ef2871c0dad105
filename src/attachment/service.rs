use chrono::Utc;
use log::error;
use uuid::Uuid;

use crate::conversation;
use crate::integration::storage::ProgressFn;

use super::model::Attachment;

#[derive(Clone)]
pub struct AttachmentService {
    storage: super::Storage,
}

impl AttachmentService {
    pub fn new(storage: super::Storage) -> Self {
        Self { storage }
    }
}

impl AttachmentService {
    /// Uploads the file under a path namespaced by conversation with a
    /// randomized name, and returns the public URL. A failed upload is not
    /// resumed or cleaned up here; the caller decides whether to retry.
    pub async fn upload(
        &self,
        attachment: &Attachment,
        conversation_id: &conversation::Id,
        on_progress: Option<ProgressFn>,
    ) -> super::Result<String> {
        let data = tokio::fs::read(attachment.path()).await?;
        let object_path = Self::object_path(conversation_id, attachment);

        let url = self
            .storage
            .upload(
                &object_path,
                data.into(),
                attachment.mime_type(),
                on_progress,
            )
            .await
            .inspect_err(|e| error!("failed to upload attachment {}: {e:?}", attachment.id()))?;

        Ok(url)
    }

    /// At most [`super::MAX_PER_MESSAGE`] attachments go out with one message.
    pub fn validate_batch(attachments: &[Attachment]) -> super::Result<()> {
        if attachments.len() > super::MAX_PER_MESSAGE {
            return Err(super::Error::TooMany(attachments.len()));
        }

        Ok(())
    }

    // timestamp plus random suffix, to avoid collisions
    fn object_path(conversation_id: &conversation::Id, attachment: &Attachment) -> String {
        let stamp = Utc::now().timestamp_millis();
        let suffix = Uuid::new_v4().simple();

        match attachment.extension() {
            Some(ext) => format!("{conversation_id}/{stamp}_{suffix}.{ext}"),
            None => format!("{conversation_id}/{stamp}_{suffix}"),
        }
    }
}
