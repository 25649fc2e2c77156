use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lopdf::{dictionary, Document, Object, Stream};
use pdf_rebuild::pdf::encode_ascii_hex;
use pdf_rebuild::source::LopdfSource;
use pdf_rebuild::PDFRebuilder;

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

/// Page tree with one content stream and one shared image per page
fn document(pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let image = doc.add_object(Stream::new(
        dictionary! {
            "Type" => name("XObject"),
            "Subtype" => name("Image"),
            "Filter" => name("DCTDecode"),
        },
        (0..4096).map(|i| (i % 251) as u8).collect(),
    ));

    let kids: Vec<Object> = (0..pages)
        .map(|i| {
            let content = doc.add_object(Stream::new(
                dictionary! {},
                format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET q /Im0 Do Q", i).into_bytes(),
            ));
            doc.add_object(dictionary! {
                "Type" => name("Page"),
                "Parent" => pages_id,
                "Contents" => content,
                "Resources" => dictionary! {
                    "XObject" => dictionary! { "Im0" => image },
                },
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => name("Pages"),
            "Count" => pages as i64,
            "Kids" => kids,
        }),
    );
    let catalog = doc.add_object(dictionary! {
        "Type" => name("Catalog"),
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog);
    doc
}

fn bench_rebuild(c: &mut Criterion) {
    let mut group = c.benchmark_group("rebuild/document");
    let rebuilder = PDFRebuilder::new();

    for pages in [10, 100, 1000] {
        let doc = document(pages);
        group.bench_with_input(BenchmarkId::from_parameter(pages), &doc, |b, doc| {
            b.iter(|| rebuilder.rebuild(&LopdfSource::new(black_box(doc))).ok())
        });
    }

    group.finish();
}

fn bench_hex_armor(c: &mut Criterion) {
    let data: Vec<u8> = (0..65536).map(|i| (i % 256) as u8).collect();

    c.bench_function("rebuild/hex_armor_64k", |b| {
        b.iter(|| encode_ascii_hex(black_box(&data), 40))
    });
}

criterion_group!(benches, bench_rebuild, bench_hex_armor);

criterion_main!(benches);
