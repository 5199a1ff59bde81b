//! Declarative contract section content consumed by the template builder

/// A numbered contract section: heading plus body paragraphs
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub number: u32,
    pub title: &'static str,
    pub paragraphs: &'static [&'static str],
}

/// The contract body, section by section. Source-controlled text instead of
/// a binary template blob; placeholders are resolved at generation time.
pub const CONTRACT_SECTIONS: &[Section] = &[
    Section {
        number: 1,
        title: "Предмет договора",
        paragraphs: &[
            "1.1. Исполнитель обязуется оказать Заказчику услуги, указанные в Задании \
             Заказчика № 1, являющемся неотъемлемой частью настоящего договора, а Заказчик \
             обязуется принять и оплатить эти услуги в порядке и на условиях, установленных \
             настоящим договором.",
            "1.2. Сроки оказания услуг, их содержание и иные требования к услугам \
             определяются в Задании Заказчика.",
            "1.3. Услуги считаются оказанными надлежащим образом с момента подписания \
             Сторонами акта сдачи-приёмки оказанных услуг либо по истечении 5 (пяти) рабочих \
             дней с момента направления акта Заказчику при отсутствии мотивированных \
             возражений.",
        ],
    },
    Section {
        number: 2,
        title: "Права и обязанности Сторон",
        paragraphs: &[
            "2.1. Исполнитель обязуется оказать услуги лично либо с привлечением третьих \
             лиц, оставаясь ответственным за их действия перед Заказчиком.",
            "2.2. Заказчик обязуется своевременно предоставлять Исполнителю информацию и \
             материалы, необходимые для оказания услуг.",
            "2.3. Заказчик вправе проверять ход и качество оказания услуг, не вмешиваясь в \
             деятельность Исполнителя.",
        ],
    },
    Section {
        number: 3,
        title: "Стоимость услуг и порядок расчётов",
        paragraphs: &[
            "3.1. Общая стоимость услуг по настоящему договору составляет {{total_price}}. \
             НДС не облагается в связи с применением Исполнителем упрощённой системы \
             налогообложения.",
            "3.2. Оплата производится в безналичном порядке на расчётный счёт Исполнителя \
             в сроки, установленные Заданием Заказчика.",
            "3.3. Обязательство Заказчика по оплате считается исполненным с момента \
             зачисления денежных средств на расчётный счёт Исполнителя.",
        ],
    },
    Section {
        number: 4,
        title: "Ответственность Сторон",
        paragraphs: &[
            "4.1. За неисполнение или ненадлежащее исполнение обязательств по настоящему \
             договору Стороны несут ответственность в соответствии с действующим \
             законодательством Российской Федерации.",
            "4.2. Стороны освобождаются от ответственности за частичное или полное \
             неисполнение обязательств, если оно явилось следствием обстоятельств \
             непреодолимой силы.",
        ],
    },
    Section {
        number: 5,
        title: "Срок действия договора",
        paragraphs: &[
            "5.1. Настоящий договор вступает в силу с момента его подписания Сторонами и \
             действует до полного исполнения Сторонами своих обязательств.",
            "5.2. Договор может быть расторгнут по соглашению Сторон либо в одностороннем \
             порядке в случаях, предусмотренных законодательством Российской Федерации.",
        ],
    },
    Section {
        number: 6,
        title: "Прочие условия",
        paragraphs: &[
            "6.1. Все споры и разногласия, возникающие из настоящего договора, Стороны \
             разрешают путём переговоров, а при недостижении согласия — в судебном порядке \
             по месту нахождения Исполнителя.",
            "6.2. Настоящий договор составлен в двух экземплярах, имеющих равную \
             юридическую силу, по одному для каждой из Сторон.",
            "6.3. Во всём, что не предусмотрено настоящим договором, Стороны \
             руководствуются действующим законодательством Российской Федерации.",
        ],
    },
];
