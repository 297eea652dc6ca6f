pub const SAMPLE_SUBMISSION: &str = r#"# Sample submission document for `gavel import`.
# One document becomes one submission; a fresh import creates a temporary
# workspace that `gavel workspace save` makes permanent.
label: sample-batch
questions:
  - text: "Which of the following is a prime number? A) 21 B) 23 C) 25"
    type: multiple_choice
    answer:
      choice: "B"
  - text: "Is the Earth flat? Answer yes or no and justify your answer."
    type: single_choice_with_reasoning
    answer:
      choice: "no"
      reasoning: "Satellite imagery and circumnavigation both show a sphere."
  - text: "Explain the difference between a stack and a queue."
    type: free_form
    answer:
      text: "A stack is LIFO, a queue is FIFO."
  - text: "An untyped question gets the generic grading instruction."
"#;
