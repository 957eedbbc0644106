//! Prompt copy and fixed lines spoken by the pet.

use crate::models::BallMood;

pub const SEARCHING_NOTICE: &str = "正在尋找最適合您的寵物...";
pub const NOT_ADOPTED_NOTICE: &str = "請先認養寵物！";
pub const ADOPT_USAGE: &str = "用法：?adopt <寵物名字>";
pub const TEST_REPLY: &str = "測試成功！";

pub const GIFT_COLOUR: u32 = 0x44ff00;
pub const BAD_MOOD_COLOUR: u32 = 0xff0000;

pub const BALLS: [&str; 3] = ["🏀", "⚽", "⚾"];

pub fn describe_prompt(name: &str) -> String {
    format!("你是一隻可愛的寵物，名字叫做{}，請描述一下你自己", name)
}

pub fn released_notice(name: &str) -> String {
    format!("{} 已經離開了，新的寵物即將到來。", name)
}

pub struct PetCharacter<'a> {
    pub name: &'a str,
    pub description: &'a str,
}

impl<'a> PetCharacter<'a> {
    pub fn new(name: &'a str, description: &'a str) -> Self {
        PetCharacter { name, description }
    }

    pub fn avatar_prompt(&self) -> String {
        format!(
            "你是一隻名叫{}的寵物，設定是{}，請根據這個設定，生成一張作為寵物頭像的圖片",
            self.name, self.description
        )
    }

    pub fn greeting_prompt(&self) -> String {
        format!(
            "你是一隻名叫{}的寵物，背景設定是{}，跟主人打招呼吧",
            self.name, self.description
        )
    }

    pub fn gift_prompt(&self) -> String {
        format!(
            "你叫做 {}, 背景設定是 {}, 你去一個地方旅遊，這個地方可能是觀光景點，可能是野外，請略為描述這個地方。\
            現在你從這個地方給心愛主人帶回了一個禮物，是這個地方的土產或在這個地方買到的紀念品、美食、商品等等, \
            請描述你在此地的所見所聞，描述你帶的禮物，並給主人這一個禮物",
            self.name, self.description
        )
    }

    pub fn bad_mood_prompt(&self) -> String {
        format!(
            "你叫做 {}, 背景設定是 {}, 你心情不好, 請描述情境",
            self.name, self.description
        )
    }

    pub fn gift_title(&self) -> String {
        format!("{}的紀錄", self.name)
    }

    pub fn bad_mood_title(&self) -> String {
        format!("{}的心情", self.name)
    }

    pub fn ball_question(&self) -> String {
        format!("{}現在想玩球♪(´▽｀)，我們一起玩好不好~", self.name)
    }
}

pub fn place_prompt(story: &str) -> String {
    format!("請根據以下文章，提取出文章中的地名: \n{}", story)
}

pub fn ball_reply(mood: BallMood) -> &'static str {
    match mood {
        BallMood::Unwilling => "我不想玩這個o(≧口≦)o",
        BallMood::Okay => "嗚，好，這個球也不錯⊙.☉",
        BallMood::Happy => "好開心，最喜歡一起玩了(≧▽≦)",
    }
}

pub const BALL_TIMEOUT_REPLY: &str = "都沒有人陪我玩…(´・ω・`)";
