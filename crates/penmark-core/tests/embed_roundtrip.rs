//! End-to-end: load a document, embed a signature, re-parse the output and
//! check exactly one image landed on the target page.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::content::Content;
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Cursor;

use penmark_core::{RenderContext, Session};

fn three_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for _ in 0..3 {
        let content = Content { operations: vec![] };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => 3,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn signature_data_uri() -> String {
    let img = ImageBuffer::from_pixel(120, 60, Rgba([10u8, 10, 90, 255]));
    let mut png = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    format!("data:image/png;base64,{}", BASE64.encode(&png))
}

/// Count image XObjects reachable from a page's resources.
fn image_count(doc: &Document, page: u32) -> usize {
    let page_id = *doc.get_pages().get(&page).unwrap();
    let page_dict = doc.get_object(page_id).unwrap().as_dict().unwrap();

    let Ok(resources) = page_dict.get(b"Resources") else {
        return 0;
    };
    let resources = match resources {
        Object::Reference(id) => doc.get_object(*id).unwrap().as_dict().unwrap(),
        Object::Dictionary(dict) => dict,
        _ => return 0,
    };
    let Ok(Object::Dictionary(xobjects)) = resources.get(b"XObject") else {
        return 0;
    };

    let mut count = 0;
    for (_, obj) in xobjects.iter() {
        let resolved = match obj {
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(resolved) => resolved,
                Err(_) => continue,
            },
            other => other,
        };
        if let Object::Stream(stream) = resolved {
            let subtype = stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok();
            if subtype == Some(b"Image".as_slice()) {
                count += 1;
            }
        }
    }
    count
}

#[tokio::test]
async fn embed_adds_one_image_to_target_page_only() {
    let session = Session::default();
    session.load(&three_page_pdf()).unwrap();
    session.go_to_page(2);
    session.set_signature(signature_data_uri());

    let ctx = RenderContext::new(1.5, session.page_height(2).unwrap()).unwrap();
    let signed = session.embed_signature(&ctx).await.unwrap();

    let output = Document::load_mem(&signed).unwrap();
    assert_eq!(output.get_pages().len(), 3);
    assert_eq!(image_count(&output, 1), 0);
    assert_eq!(image_count(&output, 2), 1);
    assert_eq!(image_count(&output, 3), 0);
}

#[tokio::test]
async fn signed_output_draws_within_the_page() {
    let session = Session::default();
    session.load(&three_page_pdf()).unwrap();
    session.set_signature(signature_data_uri());

    let ctx = RenderContext::new(1.5, session.page_height(1).unwrap()).unwrap();
    let signed = session.embed_signature(&ctx).await.unwrap();

    let output = Document::load_mem(&signed).unwrap();
    let page_id = *output.get_pages().get(&1).unwrap();
    let content = output.get_page_content(page_id).unwrap();
    let text = String::from_utf8_lossy(&content);

    // The appended draw operation references the registered XObject.
    assert!(text.contains("/PenSig"), "content: {text}");
    assert!(text.contains(" cm "));
}

#[tokio::test]
async fn output_remains_loadable_after_two_signatures() {
    let session = Session::default();
    session.load(&three_page_pdf()).unwrap();

    let ctx = RenderContext::new(1.5, session.page_height(1).unwrap()).unwrap();

    session.set_signature(signature_data_uri());
    session.embed_signature(&ctx).await.unwrap();

    // Capture again and sign the same page a second time.
    session.set_signature(signature_data_uri());
    let signed = session.embed_signature(&ctx).await.unwrap();

    let output = Document::load_mem(&signed).unwrap();
    assert_eq!(image_count(&output, 1), 2);
}
