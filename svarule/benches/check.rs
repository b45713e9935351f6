use criterion::{black_box, criterion_group, criterion_main, Criterion};
use svarule::{checker::AgreementChecker, lang::en};

const TEXT: &str = "The old teacher walk to the river because the dogs runs in the park. \
    The cat and the dog sleep under the tree, and the children is happy.";

fn load_tokenizer(c: &mut Criterion) {
    c.bench_function("load tokenizer", |b| b.iter(en::tagger));
}

fn tokenize(c: &mut Criterion) {
    let tokenizer = en::tokenizer();
    c.bench_function("tokenize", |b| b.iter(|| tokenizer.tokenize(black_box(TEXT))));
}

fn check(c: &mut Criterion) {
    let tokenizer = en::tokenizer();
    let checker = AgreementChecker::default();

    c.bench_function("suggest", |b| {
        b.iter(|| checker.suggest(black_box(TEXT), &tokenizer))
    });
}

criterion_group!(benches, load_tokenizer, tokenize, check);
criterion_main!(benches);
