//! Signature embedding pipeline.
//!
//! Takes the session's pending signature and overlay geometry, converts the
//! geometry into page space, draws the raster into the target page, and
//! serializes the whole document back to bytes. The draw and serialize
//! happen on a clone of the session document that is committed only after
//! serialization succeeds, so a failure at any step leaves the session
//! exactly as it was.

use std::cell::Cell;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::error::EmbedError;
use crate::models::geometry::DocumentBox;
use crate::pdf::session::Session;
use crate::signature::DecodedSignature;
use crate::transform::{to_document_box, RenderContext};

impl Session {
    /// Embed the pending signature into the current page and return the
    /// signed document as bytes.
    ///
    /// At most one embed may be in flight per session; an overlapping call
    /// fails fast with [`EmbedError::InProgress`]. On success the signature
    /// is consumed and the mutated document replaces the session's copy; on
    /// failure no session state changes.
    pub async fn embed_signature(&self, ctx: &RenderContext) -> Result<Vec<u8>, EmbedError> {
        let _guard = EmbedGuard::acquire(&self.embed_in_flight)?;

        let page = self.current_page();
        {
            let doc = self.document.borrow();
            let doc = doc.as_ref().ok_or(EmbedError::NoDocumentLoaded)?;
            let count = doc.get_pages().len() as u32;
            if page < 1 || page > count {
                return Err(EmbedError::InvalidPageIndex(page));
            }
        }

        let signature = self.signature.borrow().clone();
        let geometry = self.overlay();

        // Decode off the interaction path.
        yield_now().await;
        let decoded = signature.decode()?;
        let scaled = decoded.scaled_size(self.config.transform.signature_scale);
        let target = to_document_box(&geometry, ctx, scaled, &self.config.transform);
        debug!(
            page,
            x = target.x,
            y = target.y,
            width = target.width,
            height = target.height,
            "computed signature box"
        );

        // Draw and serialize as a unit on a working copy.
        let mut working = self
            .document
            .borrow()
            .clone()
            .ok_or(EmbedError::NoDocumentLoaded)?;
        draw_signature(&mut working, page, &decoded, &target)?;

        yield_now().await;
        let mut bytes = Vec::new();
        working
            .save_to(&mut bytes)
            .map_err(|e| EmbedError::Serialize(e.to_string()))?;

        // Commit: one signature consumed per save.
        *self.document.borrow_mut() = Some(working);
        *self.signature.borrow_mut() = Default::default();
        self.overlay.borrow_mut().visible = false;
        debug!(bytes = bytes.len(), "embedded signature");
        Ok(bytes)
    }
}

/// Draw the decoded signature at `target` on page `page` (1-based).
///
/// The raster goes in at full resolution as an RGB image XObject with a
/// DeviceGray SMask carrying the alpha channel; the page content stream
/// scales it into the target box.
fn draw_signature(
    doc: &mut Document,
    page: u32,
    decoded: &DecodedSignature,
    target: &DocumentBox,
) -> Result<(), EmbedError> {
    let page_id = *doc
        .get_pages()
        .get(&page)
        .ok_or(EmbedError::InvalidPageIndex(page))?;

    let (rgb, alpha) = decoded.to_rgb_and_alpha();
    let (img_w, img_h) = (decoded.width() as i64, decoded.height() as i64);

    let smask_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img_w,
            "Height" => img_h,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        alpha,
    ));

    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => img_w,
            "Height" => img_h,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "SMask" => smask_id,
        },
        rgb,
    ));

    // Unique per embed, so repeated signings on one page cannot collide.
    let resource_name = format!("PenSig{}", image_id.0);
    register_xobject(doc, page_id, &resource_name, image_id)?;

    let content = format!(
        "q {:.4} 0 0 {:.4} {:.4} {:.4} cm /{} Do Q",
        target.width, target.height, target.x, target.y, resource_name
    );
    doc.add_page_contents(page_id, content.into_bytes())
        .map_err(|e| EmbedError::PageStructure(e.to_string()))?;
    Ok(())
}

/// Register `image_id` under `name` in the page's XObject resources,
/// creating the Resources and XObject dictionaries as needed.
fn register_xobject(
    doc: &mut Document,
    page_id: ObjectId,
    name: &str,
    image_id: ObjectId,
) -> Result<(), EmbedError> {
    let malformed = |what: &str| EmbedError::PageStructure(format!("page has no {what}"));

    let mut resources_obj = {
        let page_dict = doc
            .get_object_mut(page_id)
            .and_then(|o| o.as_dict_mut())
            .map_err(|_| malformed("dictionary"))?;
        page_dict
            .remove(b"Resources")
            .unwrap_or_else(|| Object::Dictionary(dictionary! {}))
    };

    match &mut resources_obj {
        Object::Reference(id) => {
            let res_dict = doc
                .get_object_mut(*id)
                .and_then(|o| o.as_dict_mut())
                .map_err(|_| malformed("resources dictionary"))?;
            xobject_dict(res_dict)?.set(name, image_id);
        }
        Object::Dictionary(dict) => {
            xobject_dict(dict)?.set(name, image_id);
        }
        _ => return Err(malformed("usable resources entry")),
    }

    let page_dict = doc
        .get_object_mut(page_id)
        .and_then(|o| o.as_dict_mut())
        .map_err(|_| malformed("dictionary"))?;
    page_dict.set("Resources", resources_obj);
    Ok(())
}

fn xobject_dict(
    res_dict: &mut lopdf::Dictionary,
) -> Result<&mut lopdf::Dictionary, EmbedError> {
    let existing = res_dict
        .remove(b"XObject")
        .unwrap_or_else(|| Object::Dictionary(dictionary! {}));

    // An indirect XObject dictionary would need a document-level rewrite;
    // replace it with a fresh inline one.
    let sanitized = match existing {
        Object::Dictionary(dict) => Object::Dictionary(dict),
        _ => Object::Dictionary(dictionary! {}),
    };

    res_dict.set("XObject", sanitized);
    match res_dict.get_mut(b"XObject") {
        Ok(Object::Dictionary(dict)) => Ok(dict),
        _ => Err(EmbedError::PageStructure(
            "XObject entry is not a dictionary".to_string(),
        )),
    }
}

/// RAII flag keeping at most one embed in flight per session.
struct EmbedGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> EmbedGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Result<Self, EmbedError> {
        if flag.replace(true) {
            return Err(EmbedError::InProgress);
        }
        Ok(Self { flag })
    }
}

impl Drop for EmbedGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// Yield once to the executor. Marks the cooperative scheduling points of
/// the pipeline (decode, serialize) without tying the library to a
/// particular runtime.
fn yield_now() -> impl Future<Output = ()> {
    struct YieldNow {
        yielded: bool,
    }

    impl Future for YieldNow {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.yielded {
                Poll::Ready(())
            } else {
                self.yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        }
    }

    YieldNow { yielded: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::test_pdf::sample_pdf;
    use crate::signature::test_support::sample_data_uri;

    fn loaded_session() -> Session {
        let session = Session::default();
        session.load(&sample_pdf(2)).unwrap();
        session.set_signature(sample_data_uri(300, 180));
        session
    }

    fn letter_ctx() -> RenderContext {
        RenderContext::new(1.5, 792.0).unwrap()
    }

    #[tokio::test]
    async fn test_embed_without_document_fails_untouched() {
        let session = Session::default();
        session.set_signature(sample_data_uri(300, 180));

        let err = session.embed_signature(&letter_ctx()).await.unwrap_err();
        assert!(matches!(err, EmbedError::NoDocumentLoaded));

        // Nothing consumed, nothing mutated.
        assert!(!session.signature().is_empty());
        assert!(!session.embed_in_flight.get());
    }

    #[tokio::test]
    async fn test_embed_without_signature_fails_untouched() {
        let session = Session::default();
        session.load(&sample_pdf(1)).unwrap();
        let before = {
            let mut bytes = Vec::new();
            session
                .document
                .borrow_mut()
                .as_mut()
                .unwrap()
                .save_to(&mut bytes)
                .unwrap();
            bytes
        };

        let err = session.embed_signature(&letter_ctx()).await.unwrap_err();
        assert!(matches!(err, EmbedError::ImageDecode(_)));

        let after = {
            let mut bytes = Vec::new();
            session
                .document
                .borrow_mut()
                .as_mut()
                .unwrap()
                .save_to(&mut bytes)
                .unwrap();
            bytes
        };
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_embed_consumes_signature() {
        let session = loaded_session();
        let bytes = session.embed_signature(&letter_ctx()).await.unwrap();
        assert!(!bytes.is_empty());
        assert!(session.signature().is_empty());
        assert!(!session.overlay().visible);

        // A second save without a fresh capture has nothing to embed.
        let err = session.embed_signature(&letter_ctx()).await.unwrap_err();
        assert!(matches!(err, EmbedError::ImageDecode(_)));
    }

    #[tokio::test]
    async fn test_overlapping_embed_rejected() {
        let session = loaded_session();
        let ctx = letter_ctx();

        let first = session.embed_signature(&ctx);
        let second = session.embed_signature(&ctx);
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert!(matches!(second.unwrap_err(), EmbedError::InProgress));
        assert!(!session.embed_in_flight.get());
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let session = Session::default();
        assert!(session.embed_signature(&letter_ctx()).await.is_err());
        // The next attempt must not see a stuck guard.
        let err = session.embed_signature(&letter_ctx()).await.unwrap_err();
        assert!(matches!(err, EmbedError::NoDocumentLoaded));
    }
}
