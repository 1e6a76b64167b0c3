use std::collections::BTreeMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use acrodrill_core::model::{
    Answer, ChoiceOption, Difficulty, Domain, ExamQuestion, PbqItem, QuestionFlags, QuestionKind,
    Zone,
};
use acrodrill_core::scoring::{score_answer, ScoringRules};
use acrodrill_core::session::{calculate_exam_results, ExamAnswer, PASS_THRESHOLD};

fn question(kind: QuestionKind) -> ExamQuestion {
    ExamQuestion {
        id: "bench".into(),
        domain: Domain::Operations,
        subdomain: "4.1".into(),
        topic: "bench".into(),
        difficulty: Difficulty::Medium,
        stem: "Bench stem".into(),
        explanation: String::new(),
        flags: QuestionFlags::default(),
        kind,
    }
}

fn options(n: usize) -> Vec<ChoiceOption> {
    (0..n)
        .map(|i| ChoiceOption {
            id: format!("o{i}"),
            text: format!("Option {i}"),
        })
        .collect()
}

fn pbq_items(n: usize) -> Vec<PbqItem> {
    (0..n)
        .map(|i| PbqItem {
            id: format!("i{i}"),
            text: format!("Item {i}"),
        })
        .collect()
}

fn bench_score_answer(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_answer");
    let rules = ScoringRules::default();

    let mcq = question(QuestionKind::SingleChoice {
        options: options(4),
        correct_answer: "o2".into(),
    });
    group.bench_function("mcq", |b| {
        let answer = Answer::Choice("o2".into());
        b.iter(|| score_answer(black_box(&mcq), black_box(&answer), &rules))
    });

    let msq = question(QuestionKind::MultiChoice {
        options: options(6),
        correct_answers: vec!["o1".into(), "o4".into()],
    });
    group.bench_function("msq_partial", |b| {
        let answer = Answer::Selection(vec!["o1".into(), "o3".into(), "o1".into()]);
        b.iter(|| score_answer(black_box(&msq), black_box(&answer), &rules))
    });

    let order = question(QuestionKind::OrderedSequence {
        items: pbq_items(6),
        correct_order: (0..6).map(|i| format!("i{i}")).collect(),
    });
    group.bench_function("pbq_order", |b| {
        let answer = Answer::Selection((0..6).rev().map(|i| format!("i{i}")).collect());
        b.iter(|| score_answer(black_box(&order), black_box(&answer), &rules))
    });

    let mapping: BTreeMap<String, String> = (0..6)
        .map(|i| (format!("i{i}"), format!("z{}", i % 3)))
        .collect();
    let drag = question(QuestionKind::ZoneAssignment {
        zones: (0..3)
            .map(|i| Zone {
                id: format!("z{i}"),
                label: format!("Zone {i}"),
            })
            .collect(),
        items: pbq_items(6),
        correct_mapping: mapping.clone(),
    });
    group.bench_function("pbq_drag", |b| {
        let answer = Answer::Mapping(mapping.clone());
        b.iter(|| score_answer(black_box(&drag), black_box(&answer), &rules))
    });

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let answers: Vec<ExamAnswer> = (0..90)
        .map(|i| ExamAnswer {
            question_id: format!("q{i}"),
            question_type: acrodrill_core::model::QuestionType::Mcq,
            answer: Answer::Choice("a".into()),
            points_earned: if i % 4 == 0 { 0.0 } else { 1.0 },
            points_possible: 1.0,
            correct: i % 4 != 0,
            domain: Domain::ALL[i % 5],
        })
        .collect();

    c.bench_function("exam_results_90", |b| {
        b.iter(|| calculate_exam_results(black_box(&answers), PASS_THRESHOLD))
    });
}

criterion_group!(benches, bench_score_answer, bench_aggregate);
criterion_main!(benches);
