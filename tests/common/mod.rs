#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use parking_lot::Mutex;
use pdf_utility_server::{
    app, config::AppConfig, services::artifact_store::Clock, state::AppState,
};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;

pub const BOUNDARY: &str = "----pdf-utility-test-boundary";
pub const TTL: Duration = Duration::from_secs(600);

/// Clock the tests move by hand.
pub struct TestClock(Mutex<DateTime<Utc>>);

impl TestClock {
    pub fn new() -> Arc<Self> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        Arc::new(Self(Mutex::new(start)))
    }

    pub fn advance(&self, by: chrono::Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock()
    }
}

pub fn test_app() -> (Router, Arc<TestClock>) {
    let clock = TestClock::new();
    let state = AppState::with_clock(TTL, clock.clone());
    (app(state, AppConfig::default().max_upload_bytes), clock)
}

/// Build a PDF whose pages are `widths` points wide (height 500).
///
/// The first half of the pages hang off an intermediate `Pages` node that
/// carries `/Rotate 90` and the shared resources, so those pages inherit
/// both. The rest are direct kids of the root.
pub fn nested_pdf(widths: &[u32]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let root_id = doc.new_object_id();
    let branch_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let split_at = widths.len() / 2;
    let mut branch_kids = Vec::new();
    let mut root_kids = vec![Object::Reference(branch_id)];

    for (index, width) in widths.iter().enumerate() {
        let content = format!("BT /F1 12 Tf 20 20 Td (page {}) Tj ET", index + 1);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
        let nested = index < split_at;

        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => if nested { branch_id } else { root_id },
            "MediaBox" => vec![0.into(), 0.into(), (*width as i64).into(), 500.into()],
            "Contents" => content_id,
        };
        if !nested {
            page.set("Resources", resources_id);
        }
        let page_id = doc.add_object(page);

        if nested {
            branch_kids.push(Object::Reference(page_id));
        } else {
            root_kids.push(Object::Reference(page_id));
        }
    }

    let branch_count = branch_kids.len() as i64;
    doc.objects.insert(
        branch_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_id,
            "Kids" => branch_kids,
            "Count" => branch_count,
            "Rotate" => 90,
            "Resources" => resources_id,
        }),
    );
    doc.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => root_kids,
            "Count" => widths.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// Page widths in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<u32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            let media_box = inherited(&doc, id, b"MediaBox").unwrap();
            let rect = media_box.as_array().unwrap();
            (rect[2].as_float().unwrap() - rect[0].as_float().unwrap()).round() as u32
        })
        .collect()
}

/// Effective `/Rotate` of every page, inheritance included.
pub fn page_rotations(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .into_values()
        .map(|id| {
            inherited(&doc, id, b"Rotate")
                .map(|o| o.as_i64().unwrap())
                .unwrap_or(0)
        })
        .collect()
}

pub fn info_string(bytes: &[u8], key: &[u8]) -> Option<String> {
    let doc = Document::load_mem(bytes).unwrap();
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    let value = doc.get_dictionary(info_id).ok()?.get(key).ok()?;
    match value {
        Object::String(raw, _) => Some(String::from_utf8_lossy(raw).into_owned()),
        _ => None,
    }
}

fn inherited(doc: &Document, page: ObjectId, key: &[u8]) -> Option<Object> {
    let mut node = doc.get_dictionary(page).ok()?;
    loop {
        if let Ok(value) = node.get(key) {
            return Some(match value {
                Object::Reference(id) => doc.get_object(*id).ok()?.clone(),
                other => other.clone(),
            });
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
}

/// Hand-built `multipart/form-data` body.
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn pdf(self, field: &str, filename: &str, data: &[u8]) -> Self {
        self.file(field, filename, "application/pdf", data)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\n\
                 Content-Disposition: form-data; name=\"{name}\"\r\n\r\n\
                 {value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers[name].to_str().unwrap()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}
