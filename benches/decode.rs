//! Benchmarks for method body decoding and reference queries.
//!
//! Bodies are synthesized so that every measured run covers:
//! - short and long slot opcodes
//! - forward and backward branches
//! - a `switch` table
//! - field and method tokens resolved through a `MemoryResolver`

use cilreader::{
    assembly::{decode_method_bodies, decode_method_body, references_member},
    matching::{MatchConfig, MemberMatchRule},
    metadata::{
        token::Token, FieldDesc, FieldModifiers, LocalVariable, MemberRef, MemoryResolver,
        MethodDesc, MethodModifiers, TypeDesc, TypeRef,
    },
    MethodBodyContext,
};
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::hint::black_box;

/// One loop iteration, 36 bytes, ending in a backward `br.s` to its first instruction
fn loop_block(code: &mut Vec<u8>) {
    let start = code.len() as i32;
    code.extend_from_slice(&[0x06, 0x17, 0x58, 0x0A]); // ldloc.0; ldc.i4.1; add; stloc.0
    code.extend_from_slice(&[0x02, 0x7B, 0x01, 0x00, 0x00, 0x04]); // ldarg.0; ldfld
    code.extend_from_slice(&[0x28, 0x01, 0x00, 0x00, 0x06]); // call
    code.extend_from_slice(&[0x45, 0x02, 0x00, 0x00, 0x00]); // switch (2)
    code.extend_from_slice(&0i32.to_le_bytes());
    code.extend_from_slice(&1i32.to_le_bytes());
    code.extend_from_slice(&[0x00, 0x00]); // nop; nop
    code.extend_from_slice(&[0x06, 0x2D, 0x01, 0x00]); // ldloc.0; brtrue.s +1; nop
    let here = code.len() as i32 + 2;
    let back = i8::try_from(start - here).unwrap_or(i8::MIN);
    code.extend_from_slice(&[0x2B, back as u8]); // br.s back to start
}

fn synthesize(blocks: usize) -> Vec<u8> {
    let mut code = Vec::new();
    for _ in 0..blocks {
        loop_block(&mut code);
    }
    code.push(0x2A);
    code
}

fn bench_decode(c: &mut Criterion) {
    let resolver = MemoryResolver::new();
    let int32 = TypeDesc::new(Token::new(0x0100_0001), "System", "Int32", 0);
    let worker = TypeDesc::new(Token::new(0x0200_0002), "Bench", "Worker", 0);
    let counter = FieldDesc::declare(
        &worker,
        Token::new(0x0400_0001),
        "counter",
        FieldModifiers::empty(),
    );
    MethodDesc::declare(
        &worker,
        Token::new(0x0600_0001),
        "Step",
        MethodModifiers::STATIC,
        Vec::new(),
    );
    resolver.register_type(&int32);
    resolver.register_type(&worker);

    let locals = [LocalVariable::new(0, TypeRef::new(&int32))];
    let code = synthesize(64);

    let ctx = MethodBodyContext::new(&code, &resolver)
        .with_static(false)
        .with_locals(&locals);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(code.len() as u64));
    group.bench_function("decode_method_body", |b| {
        b.iter(|| {
            let list = decode_method_body(black_box(&ctx)).unwrap();
            black_box(list)
        });
    });

    let rule = MemberMatchRule::new(MemberRef::Field(counter), MatchConfig::comprehensive());
    group.bench_function("references_member", |b| {
        b.iter(|| black_box(references_member(black_box(&ctx), &rule).unwrap()));
    });
    group.finish();

    let bodies = vec![ctx; 256];
    let mut group = c.benchmark_group("decode_batch");
    group.throughput(Throughput::Bytes((code.len() * bodies.len()) as u64));
    group.bench_function("decode_method_bodies", |b| {
        b.iter(|| black_box(decode_method_bodies(black_box(&bodies))));
    });
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
