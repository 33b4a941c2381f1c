use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use html_stream::{
    CharacterToken, CollectParseErrors, IgnoreParseErrors, ScriptableStream, SinkDirective,
    TagToken, TokenSink,
};

/// Counts tokens without retaining them, so the benchmark measures the
/// tokenizer rather than the sink.
#[derive(Default)]
struct CountingSink {
    tokens: usize,
}

impl TokenSink for CountingSink {
    fn on_character(&mut self, _token: &CharacterToken) -> SinkDirective {
        self.tokens += 1;
        SinkDirective::Continue
    }

    fn on_whitespace_character(&mut self, _token: &CharacterToken) -> SinkDirective {
        self.tokens += 1;
        SinkDirective::Continue
    }

    fn on_start_tag(&mut self, _token: &mut TagToken) -> SinkDirective {
        self.tokens += 1;
        SinkDirective::Continue
    }

    fn on_end_tag(&mut self, _token: &mut TagToken) -> SinkDirective {
        self.tokens += 1;
        SinkDirective::Continue
    }
}

fn sample_document(repeats: usize) -> String {
    let mut document = String::from("<!DOCTYPE html><html><head><title>bench</title></head><body>");
    for i in 0..repeats {
        document.push_str("<div class=\"row\" data-index=\"");
        document.push_str(&i.to_string());
        document.push_str("\"><p>Lorem ipsum &amp; dolor sit amet, consectetur adipiscing elit.</p></div>");
    }
    document.push_str("</body></html>");
    document
}

fn criterion_benchmark(c: &mut Criterion) {
    let document = sample_document(1000);

    let mut group = c.benchmark_group("tokenize");
    group.throughput(Throughput::Bytes(document.len() as u64));

    group.bench_with_input(
        BenchmarkId::new("single chunk", document.len()),
        &document,
        |b, document| {
            b.iter(|| {
                let mut stream =
                    ScriptableStream::new(CountingSink::default(), IgnoreParseErrors);
                stream.write(document, true).unwrap();
                stream.sink().tokens
            })
        },
    );

    group.bench_with_input(
        BenchmarkId::new("1 KiB chunks", document.len()),
        &document,
        |b, document| {
            b.iter(|| {
                let mut stream =
                    ScriptableStream::new(CountingSink::default(), CollectParseErrors::default());
                let mut chunks = document.as_bytes().chunks(1024).peekable();
                while let Some(chunk) = chunks.next() {
                    let chunk = std::str::from_utf8(chunk).unwrap();
                    stream.write(chunk, chunks.peek().is_none()).unwrap();
                }
                stream.sink().tokens
            })
        },
    );

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
