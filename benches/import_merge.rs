use criterion::{Criterion, criterion_group, criterion_main};
use octofhir_sdc::*;
use serde_json::{Value, json};
use std::hint::black_box;

const SECTIONS: usize = 20;
const QUESTIONS_PER_SECTION: usize = 10;

fn create_large_questionnaire() -> Value {
    let sections: Vec<Value> = (0..SECTIONS)
        .map(|section| {
            let questions: Vec<Value> = (0..QUESTIONS_PER_SECTION)
                .map(|question| {
                    let link_id = format!("/s{section}/q{question}");
                    match question % 3 {
                        0 => json!({"linkId": link_id, "type": "string", "repeats": true}),
                        1 => json!({
                            "linkId": link_id, "type": "choice",
                            "answerOption": [
                                {"valueCoding": {"system": "http://loinc.org", "code": "LA33-6", "display": "Yes"}},
                                {"valueCoding": {"system": "http://loinc.org", "code": "LA32-8", "display": "No"}}
                            ]
                        }),
                        _ => json!({
                            "linkId": link_id, "type": "decimal",
                            "extension": [{
                                "url": "http://hl7.org/fhir/StructureDefinition/questionnaire-unitOption",
                                "valueCoding": {"system": "http://unitsofmeasure.org", "code": "kg"}
                            }]
                        }),
                    }
                })
                .collect();
            json!({"linkId": format!("/s{section}"), "type": "group", "repeats": true, "item": questions})
        })
        .collect();

    json!({"resourceType": "Questionnaire", "id": "bench", "item": sections})
}

fn create_response() -> QuestionnaireResponse {
    let sections: Vec<Value> = (0..SECTIONS)
        .flat_map(|section| {
            (0..2).map(move |occurrence| {
                let answers: Vec<Value> = (0..QUESTIONS_PER_SECTION)
                    .map(|question| {
                        let link_id = format!("/s{section}/q{question}");
                        let answer = match question % 3 {
                            0 => json!({"valueString": format!("answer {occurrence}")}),
                            1 => json!({"valueCoding": {"system": "http://loinc.org", "code": "LA33-6"}}),
                            _ => json!({"valueQuantity": {
                                "value": 70.5, "system": "http://unitsofmeasure.org", "code": "kg"}}),
                        };
                        json!({"linkId": link_id, "answer": [answer]})
                    })
                    .collect();
                json!({"linkId": format!("/s{section}"), "item": answers})
            })
        })
        .collect();

    serde_json::from_value(json!({"resourceType": "QuestionnaireResponse", "item": sections}))
        .unwrap()
}

fn bench_questionnaire_import(c: &mut Criterion) {
    let questionnaire: Questionnaire =
        serde_json::from_value(create_large_questionnaire()).unwrap();
    let converter = QuestionnaireConverter::new();

    c.bench_function("questionnaire_import", |b| {
        b.iter(|| black_box(converter.convert(&questionnaire)).unwrap())
    });
}

fn bench_response_merge(c: &mut Criterion) {
    let form = QuestionnaireConverter::new()
        .convert_value(create_large_questionnaire())
        .unwrap();
    let response = create_response();
    let merger = ResponseMerger::default();

    c.bench_function("response_merge", |b| {
        b.iter(|| {
            let mut form = form.clone();
            black_box(merger.merge(&mut form, &response))
        })
    });
}

fn bench_form_serialization(c: &mut Criterion) {
    let mut form = QuestionnaireConverter::new()
        .convert_value(create_large_questionnaire())
        .unwrap();
    ResponseMerger::default().merge(&mut form, &create_response());

    c.bench_function("form_json_serialization", |b| {
        b.iter(|| black_box(serde_json::to_string(&form)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_questionnaire_import,
    bench_response_merge,
    bench_form_serialization
);
criterion_main!(benches);
