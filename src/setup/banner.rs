pub const RULE_WIDTH: usize = 60;

const PIKACHU: &str = r#"
      \:.             .:/
       \``._________.''/
        \             /
 .--.--, / .':.   .':. \
/__:  /  | '::' . '::' |
   / /   |`.   ._.   .'|
  / /    |.'         '.|
 /___-_-,|.\  \   /  /.|
      // |''\.;   ;,/ '|
      `==|:=         =:|
         `.          .'
           :-._____.-:
          `''       `''"#;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn print_banner() {
    println!("{}", rule());
    println!("{}", PIKACHU);
    println!("   POKEMON IMAGE PROCESSING PIPELINE");
    println!("{}", rule());
}
