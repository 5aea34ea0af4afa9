//! Create-post page (`/create`).

use std::path::Path;

use rc_core::error::{AppError, Result};
use rc_core::models::CreatePostInput;
use rc_core::routes::Route;
use rc_core::validation::{validate_post, Field, FormErrors};
use rc_ui::CreatePostTemplate;
use tracing::{error, info};
use uuid::Uuid;

use crate::components::{Header, ImageDropzone};
use crate::context::{render, AppContext};

#[derive(Default)]
pub struct CreatePostPage {
    title: String,
    content: String,
    dropzone: ImageDropzone,
    errors: FormErrors,
    loading: bool,
}

impl CreatePostPage {
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn dropzone(&self) -> &ImageDropzone {
        &self.dropzone
    }

    pub fn dropzone_mut(&mut self) -> &mut ImageDropzone {
        &mut self.dropzone
    }

    pub async fn pick_image(&mut self, path: &Path) -> Result<()> {
        let result = self.dropzone.pick(path).await;
        self.errors = match &result {
            Err(AppError::Validation(errors)) => errors.clone(),
            _ => FormErrors::default(),
        };
        result
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Validates, uploads the image if one is attached, then creates the post.
    /// Returns the route of the new post.
    pub async fn submit(&mut self, ctx: &AppContext) -> Result<Route> {
        if let Err(e) = validate_post(&self.title, &self.content) {
            if let AppError::Validation(errors) = &e {
                self.errors = errors.clone();
            }
            return Err(e);
        }
        self.errors = FormErrors::default();
        ctx.session.require("create a post")?;

        self.loading = true;
        let result = self.publish(ctx).await;
        self.loading = false;

        match result {
            Ok(id) => {
                info!(post_id = %id, "post created");
                Ok(Route::Post(id))
            }
            Err(e) => {
                error!(error = %e, "error creating post");
                Err(e)
            }
        }
    }

    async fn publish(&self, ctx: &AppContext) -> Result<String> {
        let image = match self.dropzone.file() {
            Some(file) => {
                let key = Uuid::new_v4().to_string();
                ctx.store.put(&key, file.data.clone(), &file.content_type).await?;
                info!(%key, size = file.data.len(), "image uploaded");
                Some(key)
            }
            None => None,
        };
        let post = ctx
            .gateway
            .create_post(CreatePostInput {
                title: self.title.clone(),
                contents: self.content.clone(),
                image,
            })
            .await?;
        Ok(post.id)
    }

    pub fn render(&self, ctx: &AppContext) -> Result<String> {
        let header = Header::render(ctx)?;
        let dropzone = self.dropzone.render()?;
        render(&CreatePostTemplate {
            header: &header,
            title: &self.title,
            content: &self.content,
            title_error: self.errors.get(Field::Title),
            content_error: self.errors.get(Field::Content),
            dropzone: &dropzone,
            loading: self.loading,
        })
    }
}
