use crate::model::{BatchSummary, Verdict};

pub fn print_summary(summary: &BatchSummary) {
    for r in &summary.results {
        match r.verdict {
            Verdict::Pass => {}
            Verdict::Fail => eprintln!("FAIL [q{} j{}]", r.question_id, r.judge_id),
            Verdict::Inconclusive => match &r.error {
                Some(err) => eprintln!(
                    "INCONCLUSIVE [q{} j{}]: {}",
                    r.question_id, r.judge_id, err
                ),
                None => eprintln!("INCONCLUSIVE [q{} j{}]", r.question_id, r.judge_id),
            },
        }
    }

    eprintln!(
        "Results: processed={} pass={} fail={} inconclusive={}",
        summary.processed, summary.passed, summary.failed, summary.inconclusive
    );
}
