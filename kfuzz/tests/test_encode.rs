use std::io::Write;

use kfuzz::{
    blob::BlobView,
    constants::*,
    encode::{encode, header_size, RelocInfo},
    layout::Layout,
    parse::{parse_str, Field, Program},
    prelude::*,
    SemanticError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn seed(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut bytes = vec![0; len];
    rng.fill(&mut bytes[..]);
    bytes
}

fn read_u32(blob: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(blob[offset..offset + 4].try_into().unwrap())
}

#[test]
fn test_scenario_a() {
    let seed = [0x5A];
    let blob = compile(include_str!("scenario_a.kfz"), SeedSlice::new(&seed).unwrap()).unwrap();

    assert_eq!(read_u32(&blob, 0), MAGIC);
    assert_eq!(read_u32(&blob, 4), VERSION);
    assert_eq!(read_u32(&blob, 8), 3);

    let view = BlobView::decode(&blob).unwrap();
    let table = view
        .regions
        .iter()
        .map(|r| (r.offset, r.size))
        .collect::<Vec<_>>();
    // data 0..42, gap; foo aligned to 56; bar aligned to 72, u32 then padded ptr
    assert_eq!(table, vec![(0, 42), (56, 8), (72, 16)]);

    assert_eq!(
        view.relocations,
        vec![
            RelocInfo {
                src_region: 1,
                offset: 0,
                dst_region: 0
            },
            RelocInfo {
                src_region: 2,
                offset: 8,
                dst_region: 1
            },
        ]
    );

    // 68 header bytes padded so the payload lands on 80
    assert_eq!(header_size(3, 2), 68);
    assert_eq!(view.padding, 12);
    assert_eq!(view.payload_start, 80);
    assert_eq!(view.payload.len(), 96);
    assert_eq!(blob.len(), 176);

    assert_eq!(view.region_bytes(0).unwrap(), &[0x5A; 42][..]);
    for reloc in &view.relocations {
        assert_eq!(view.pointer_value(reloc), Some(POINTER_PLACEHOLDER));
    }

    // Poison gaps and padding stay zero.
    assert!(view.payload[42..56].iter().all(|b| *b == 0));
    assert!(view.payload[76..80].iter().all(|b| *b == 0));
    assert!(view.payload[88..].iter().all(|b| *b == 0));
}

#[test]
fn test_scenario_b_unresolved() {
    let seed = [1];
    let err = compile(
        "data { u8 } foo { ptr[missing] }",
        SeedSlice::new(&seed).unwrap(),
    )
    .unwrap_err();

    match err {
        KfuzzError::Semantic(SemanticError::UnresolvedRegion {
            region,
            target,
            span,
        }) => {
            assert_eq!(region, "foo");
            assert_eq!(target, "missing");
            assert_eq!(span.index, 22);
        }
        other => panic!("expected unresolved region, got {other}"),
    }
}

#[test]
fn test_scenario_c_duplicate() {
    let seed = [1];
    let err = compile("a { u8 } b { u16 } a { u32 }", SeedSlice::new(&seed).unwrap()).unwrap_err();

    match err {
        KfuzzError::Semantic(SemanticError::DuplicateRegion { name, span }) => {
            assert_eq!(name, "a");
            assert_eq!(span.index, 19);
        }
        other => panic!("expected duplicate region, got {other}"),
    }
}

#[test]
fn test_scenario_d_empty_region() {
    let seed = [0xEE];
    let blob = compile("x { }", SeedSlice::new(&seed).unwrap()).unwrap();
    let view = BlobView::decode(&blob).unwrap();

    assert_eq!(view.regions.len(), 1);
    assert_eq!((view.regions[0].offset, view.regions[0].size), (0, 0));
    assert_eq!(view.payload, &[0; POISON_GAP][..]);
    assert_eq!(blob.len(), 28 + 8 + 8);

    let blob = compile("a { u8 } x { } b { u8 }", SeedSlice::new(&seed).unwrap()).unwrap();
    let view = BlobView::decode(&blob).unwrap();
    let offsets = view.regions.iter().map(|r| r.offset).collect::<Vec<_>>();
    assert_eq!(offsets, vec![0, 9, 17]);
}

/// Random well formed program with `count` regions.
fn random_program(rng: &mut StdRng, count: usize) -> String {
    let mut source = String::new();

    for i in 0..count {
        let fields = (0..rng.gen_range(0..6))
            .map(|_| match rng.gen_range(0..3) {
                0 => ["u8", "u16", "u32", "u64"][rng.gen_range(0..4)].to_string(),
                1 => format!(
                    "arr[{}, {}]",
                    ["u8", "u16", "u32", "u64"][rng.gen_range(0..4)],
                    rng.gen_range(0..20)
                ),
                _ => format!("ptr[r{}]", rng.gen_range(0..count)),
            })
            .collect::<Vec<_>>();

        source.push_str(&format!("r{i} {{ {} }}\n", fields.join(", ")));
    }

    source
}

#[test]
fn test_blob_properties() {
    let mut rng = StdRng::seed_from_u64(0xBFACE);

    for _ in 0..200 {
        let count = rng.gen_range(1..8);
        let source = random_program(&mut rng, count);
        let program = parse_str(&source).unwrap();
        let len = rng.gen_range(1..64);
        let seed_bytes = seed(&mut rng, len);

        let blob = encode(&program, SeedSlice::new(&seed_bytes).unwrap()).unwrap();
        let view = BlobView::decode(&blob).unwrap();

        assert_eq!(view.regions.len(), program.regions.len(), "{source}");
        assert_eq!(view.relocations.len(), program.pointer_count(), "{source}");
        assert_eq!(view.payload_start % program.alignment() as usize, 0);
        assert!(view.padding as usize >= POISON_GAP);

        for (entry, region) in view.regions.iter().zip(&program.regions) {
            assert_eq!(entry.offset as u64 % region.alignment(), 0, "{source}");
            // Padding only ever grows a region.
            assert!(entry.size as u64 >= region.size(), "{source}");
        }

        for reloc in &view.relocations {
            assert_eq!(reloc.offset as u64 % POINTER_WIDTH, 0, "{source}");
            assert!((reloc.dst_region as usize) < program.regions.len());
            assert_eq!(view.pointer_value(reloc), Some(POINTER_PLACEHOLDER));
        }
    }
}

#[test]
fn test_seed_only_affects_contents() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..50 {
        let count = rng.gen_range(1..6);
        let program = parse_str(&random_program(&mut rng, count)).unwrap();
        let seed_a = seed(&mut rng, 17);
        let seed_b = seed(&mut rng, 31);

        let blob_a = encode(&program, SeedSlice::new(&seed_a).unwrap()).unwrap();
        let blob_a2 = encode(&program, SeedSlice::new(&seed_a).unwrap()).unwrap();
        let blob_b = encode(&program, SeedSlice::new(&seed_b).unwrap()).unwrap();

        assert_eq!(blob_a, blob_a2);
        assert_eq!(blob_a.len(), blob_b.len());

        let view_a = BlobView::decode(&blob_a).unwrap();
        let view_b = BlobView::decode(&blob_b).unwrap();
        assert_eq!(view_a.regions, view_b.regions);
        assert_eq!(view_a.relocations, view_b.relocations);

        // Placeholders are identical across seeds.
        for reloc in &view_b.relocations {
            assert_eq!(view_b.pointer_value(reloc), Some(u64::MAX));
        }
        assert_eq!(blob_a[..view_a.payload_start], blob_b[..view_b.payload_start]);
    }
}

#[test]
fn test_compile_with_seed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&[1, 2, 3]).unwrap();
    file.flush().unwrap();

    let conf = KfuzzConf {
        seed_cache_size: 2,
    };
    let blob = compile_with_seed("a { arr[u8, 7] }", file.path(), &conf).unwrap();
    let view = BlobView::decode(&blob).unwrap();
    assert_eq!(view.region_bytes(0).unwrap(), &[1u8, 2, 3, 1, 2, 3, 1][..]);
}

#[test]
fn test_empty_seed_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let err = compile_with_seed("a { u8 }", file.path(), &KfuzzConf::default()).unwrap_err();
    assert!(matches!(err, KfuzzError::Source(kfuzz::SourceError::Empty)));
}

#[test]
fn test_program_without_fields_needs_no_bytes() {
    // Never reads from the seed: pointers and empty regions only.
    struct Exhausted;

    impl ByteSource for Exhausted {
        fn next_byte(&mut self) -> Result<u8, kfuzz::SourceError> {
            Err(kfuzz::SourceError::Empty)
        }
    }

    let program: Program = parse_str("a { ptr[b] } b { }").unwrap();
    assert!(program.regions[0]
        .fields
        .iter()
        .all(|f| matches!(f, Field::Pointer(_))));
    encode(&program, Exhausted).unwrap();

    let program = parse_str("a { u8 }").unwrap();
    assert!(matches!(
        encode(&program, Exhausted),
        Err(KfuzzError::Source(kfuzz::SourceError::Empty))
    ));
}
