use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use acrodrill_core::distractors::{generate_distractors, SimilarityMode};
use acrodrill_core::model::{
    Category, ChoiceOption, Difficulty, Domain, ExamPreset, ExamQuestion, Item, QuestionFlags,
    QuestionKind,
};
use acrodrill_core::progress::{HistoryMap, ProgressMap, ProgressRecord};
use acrodrill_core::repository::{BankMeta, QuestionBank};
use acrodrill_core::selection::{select_exam_questions, select_hard_mode, select_reinforcement};

const CATEGORIES: [Category; 4] = [
    Category::Protocol,
    Category::Crypto,
    Category::Attack,
    Category::Tool,
];

fn catalogue(n: usize) -> Vec<Item> {
    (0..n)
        .map(|i| Item {
            id: format!("A{i:03}"),
            full_name: format!("Alpha Bravo {} Protocol", i % 17),
            phonetic: String::new(),
            domain: Domain::ALL[i % 5],
            category: CATEGORIES[i % 4],
            difficulty: Difficulty::Easy,
            mnemonic: String::new(),
            example: String::new(),
            exam_tip: String::new(),
            confused_with: vec![format!("A{:03}", (i + 1) % n)],
        })
        .collect()
}

fn progress(items: &[Item]) -> ProgressMap {
    let now = chrono::Utc::now();
    items
        .iter()
        .step_by(2)
        .enumerate()
        .map(|(i, item)| {
            let mut record = ProgressRecord::new(item.id.clone());
            for n in 0..(i % 6) {
                record.record_test_answer(n % 3 != 0, now);
            }
            (item.id.clone(), record)
        })
        .collect()
}

fn bank(per_domain: usize) -> QuestionBank {
    let mut questions = Vec::new();
    for domain in Domain::ALL {
        for i in 0..per_domain {
            let difficulty = match i % 5 {
                0 | 1 => Difficulty::Easy,
                4 => Difficulty::Hard,
                _ => Difficulty::Medium,
            };
            questions.push(ExamQuestion {
                id: format!("{domain}-{i}"),
                domain,
                subdomain: String::new(),
                topic: String::new(),
                difficulty,
                stem: "Stem".into(),
                explanation: String::new(),
                flags: QuestionFlags::default(),
                kind: QuestionKind::SingleChoice {
                    options: vec![ChoiceOption {
                        id: "a".into(),
                        text: "A".into(),
                    }],
                    correct_answer: "a".into(),
                },
            });
        }
    }
    QuestionBank::new(BankMeta::default(), questions)
}

fn bench_item_selection(c: &mut Criterion) {
    let items = catalogue(400);
    let progress = progress(&items);
    let mut group = c.benchmark_group("item_selection");

    group.bench_function("reinforcement_20", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        b.iter(|| select_reinforcement(black_box(&items), &progress, 20, &mut rng))
    });

    group.bench_function("hard_mode_35", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        b.iter(|| select_hard_mode(black_box(&items), &progress, 35, &mut rng))
    });

    group.bench_function("distractors_full_name", |b| {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        b.iter(|| {
            generate_distractors(
                black_box(&items[7]),
                &items,
                3,
                SimilarityMode::FullName,
                &mut rng,
            )
        })
    });

    group.finish();
}

fn bench_exam_selection(c: &mut Criterion) {
    let bank = bank(120);
    let history = HistoryMap::new();
    let mut group = c.benchmark_group("exam_selection");

    for preset in ExamPreset::ALL {
        let config = preset.config();
        group.bench_function(preset.to_string(), |b| {
            let mut rng = ChaCha8Rng::seed_from_u64(4);
            b.iter(|| select_exam_questions(black_box(&bank), &history, &config, &mut rng))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_item_selection, bench_exam_selection);
criterion_main!(benches);
