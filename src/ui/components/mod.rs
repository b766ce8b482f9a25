pub mod question_card;
