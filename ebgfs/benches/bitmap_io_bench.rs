use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use ebgfs::ext::*;
use ebgfs::fs::ext::constant::*;
use std::io::Write;
use zerocopy::IntoBytes;

const BLOCK_SIZE: usize = 1024;
const GROUPS: u32 = 64;
const BLOCKS_PER_GROUP: u32 = 512;
const INODES_PER_GROUP: u32 = 64;
const UUID: [u8; 16] = [0x7E; 16];

/// Builds a 32 MiB filesystem image with 64 checksummed groups.
///
/// With `uninit` every group but the first carries the lazy-init flags,
/// so loads take the synthesized path instead of touching the device.
fn build_image(uninit: bool) -> Vec<u8> {
    let blocks_count = 1 + GROUPS * BLOCKS_PER_GROUP;

    let mut sb = ExtSuperblock::default();
    sb.s_blocks_count = blocks_count;
    sb.s_inodes_count = GROUPS * INODES_PER_GROUP;
    sb.s_blocks_per_group = BLOCKS_PER_GROUP;
    sb.s_inodes_per_group = INODES_PER_GROUP;
    sb.s_uuid = UUID;
    sb.s_feature_ro_compat = EXT_FEATURE_RO_COMPAT_GDT_CSUM | EXT_FEATURE_RO_COMPAT_SPARSE_SUPER;

    let mut descs = Vec::with_capacity(GROUPS as usize);
    for g in 0..GROUPS {
        // Leave room for the superblock and descriptor backups in the
        // groups that carry them; the others just skip three blocks.
        let first = 1 + g * BLOCKS_PER_GROUP;
        let mut desc = ExtGroupDesc::new(
            first + 3,
            first + 4,
            first + 5,
            BLOCKS_PER_GROUP as u16,
            INODES_PER_GROUP as u16,
            0,
        );
        if uninit && g != 0 {
            desc.bg_flags = BgFlags::lazy_init();
            desc.bg_itable_unused = INODES_PER_GROUP as u16;
        }
        descs.push(desc);
    }
    let mut table = GroupDescTable::from_descs(descs);
    for g in 0..GROUPS {
        table.set_checksum(&UUID, g);
    }

    let mut image = vec![0u8; blocks_count as usize * BLOCK_SIZE];
    image[1024..2048].copy_from_slice(sb.as_bytes());
    let raw = table.as_bytes();
    image[2048..2048 + raw.len()].copy_from_slice(raw);
    image
}

fn bench_bitmap_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitmap_load");
    const SPAN_BYTES: u64 = GROUPS as u64 * 2 * BLOCK_SIZE as u64;

    let mut init_buf = build_image(false);
    let mut uninit_buf = build_image(true);

    group.throughput(Throughput::Bytes(SPAN_BYTES));
    group.bench_function("load_64g_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut init_buf);
            let mut fs = ExtFs::open(&mut io).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
        });
    });

    group.bench_function("load_64g_uninit_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut uninit_buf);
            let mut fs = ExtFs::open(&mut io).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
        });
    });

    // DISK SETUP
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&init_buf).unwrap();

    group.bench_function("load_64g_disk", |b| {
        b.iter(|| {
            let mut io = StdBlockIO::new(&mut file);
            let mut fs = ExtFs::open(&mut io).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
        });
    });

    group.finish();
}

fn bench_bitmap_load_streamed(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitmap_load_streamed");
    // One bit per block plus one per inode, stored as flat runs.
    const SPAN_BYTES: u64 =
        (GROUPS * BLOCKS_PER_GROUP) as u64 / 8 + (GROUPS * INODES_PER_GROUP) as u64 / 8;

    let mut buf = build_image(false);
    let layout = ImageLayout {
        block_bitmap_start: 8,
        inode_bitmap_start: 16,
    };

    group.throughput(Throughput::Bytes(SPAN_BYTES));
    group.bench_function("load_64g_image_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut buf);
            let mut fs = ExtFs::open_image(&mut io, layout).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
        });
    });

    group.finish();
}

fn bench_bitmap_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("bitmap_flush");
    const SPAN_BYTES: u64 = GROUPS as u64 * 2 * BLOCK_SIZE as u64;

    let mut buf = build_image(false);

    group.throughput(Throughput::Bytes(SPAN_BYTES));
    group.bench_function("mark_flush_64g_mem", |b| {
        b.iter(|| {
            let mut io = MemBlockIO::new(&mut buf);
            let mut fs = ExtFs::open_rw(&mut io).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
            for g in 0..GROUPS {
                fs.mark(BitmapKind::Block, g * BLOCKS_PER_GROUP + 1).unwrap();
                fs.mark(BitmapKind::Inode, g * INODES_PER_GROUP + 1).unwrap();
            }
            fs.close().unwrap();
        });
    });

    // DISK SETUP
    let image = build_image(false);
    let mut file = tempfile::tempfile().unwrap();
    file.write_all(&image).unwrap();

    group.bench_function("mark_flush_64g_disk", |b| {
        b.iter(|| {
            let mut io = StdBlockIO::new(&mut file);
            let mut fs = ExtFs::open_rw(&mut io).unwrap();
            fs.load_bitmaps(KindSet::BLOCK | KindSet::INODE).unwrap();
            for g in 0..GROUPS {
                fs.mark(BitmapKind::Block, g * BLOCKS_PER_GROUP + 1).unwrap();
                fs.mark(BitmapKind::Inode, g * INODES_PER_GROUP + 1).unwrap();
            }
            fs.close().unwrap();
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_bitmap_load,
    bench_bitmap_load_streamed,
    bench_bitmap_flush
);
criterion_main!(benches);
